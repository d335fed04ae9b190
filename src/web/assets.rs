pub const INDEX_HTML: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/src/web/assets/index.html"
));
pub const STYLES_CSS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/src/web/assets/styles.css"
));
pub const APP_JS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/src/web/assets/app.js"
));

pub fn sprite(name: &str) -> Option<&'static [u8]> {
    match name {
        "tree.svg" => Some(include_bytes!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/src/web/assets/sprites/tree.svg"
        ))),
        "seed.svg" => Some(include_bytes!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/src/web/assets/sprites/seed.svg"
        ))),
        "water.svg" => Some(include_bytes!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/src/web/assets/sprites/water.svg"
        ))),
        "factory.svg" => Some(include_bytes!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/src/web/assets/sprites/factory.svg"
        ))),
        _ => None,
    }
}
