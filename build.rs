fn main() {
    println!("cargo:rerun-if-changed=web/io_cgi.ssi");
    println!("cargo:rerun-if-changed=web/perror.htm");

    // ESP-IDF link args and sysenv only apply to device builds.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
