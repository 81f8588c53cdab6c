/// Content hash used as the dedup key for business listing URLs.
pub fn url_hash(url: &str) -> String {
    blake3::hash(url.trim().as_bytes()).to_hex().to_string()
}
