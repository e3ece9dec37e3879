fn main() {
    println!("cargo:rerun-if-changed=resources/");

    if std::option_env!("TUNGLYPH_LINTING").is_none() {
        glib_build_tools::compile_resources(
            &["resources"],
            "resources/resources.gresource.xml",
            "compiled.gresource",
        );
    } else {
        println!("cargo:rustc-cfg=tunglyph_linting");
    }
}
