fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // ESP-IDF toolchain environment is only needed for flash builds.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
