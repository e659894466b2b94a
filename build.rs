fn main() {
    // Only the target build needs the ESP-IDF environment; host tests
    // compile without the `espidf` feature.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
