fn main() {
    println!("cargo:rerun-if-env-changed=INSTAMOJO_BUILD_SHA");

    let pkg = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
    let version = match std::env::var("INSTAMOJO_BUILD_SHA").ok() {
        Some(sha) => format!("{pkg} ({sha})"),
        None => pkg,
    };

    println!("cargo:rustc-env=INSTAMOJO_VERSION={version}");
}
