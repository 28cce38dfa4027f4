fn main() {
    odra_build::build_contract();
}
