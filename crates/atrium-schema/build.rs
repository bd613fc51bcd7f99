fn main() {
    cynic_codegen::register_schema("erp")
        .from_sdl_file("../../schemas/erp.graphql")
        .expect("Failed to find ERP GraphQL Schema")
        .as_default()
        .expect("Failed to set ERP schema as default");
}
