fn main() {
    odra_build::build_schema();
}
