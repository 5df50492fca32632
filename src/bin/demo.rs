fn main() {
    globes::world::main();
}
