fn main() {
    // Only emit the ESP-IDF link environment for flash builds; host builds
    // (the default feature set) must work without the xtensa toolchain.
    if std::env::var("CARGO_FEATURE_ESPIDF").is_ok() {
        embuild::espidf::sysenv::output();
    }
}
