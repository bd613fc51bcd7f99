fn main() {
    cynic_codegen::register_schema("erp")
        .from_sdl_file("schemas/erp.graphql")
        .expect("failed to load erp.graphql schema file")
        .as_default()
        .expect("failed to register erp schema as default");
}
