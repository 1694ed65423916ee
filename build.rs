fn main() {
    // Endpoint defaults are baked in with option_env!, so rebuild when they change.
    println!("cargo:rerun-if-env-changed=MENSTRA_BACKEND_URL");
    println!("cargo:rerun-if-env-changed=MENSTRA_AUTH_URL");
}
