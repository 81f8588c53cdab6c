use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;

fn main() {
    let session = SigningKey::generate(&mut OsRng);
    let public_key = hex::encode(session.verifying_key().to_bytes());
    let private_key = hex::encode(session.to_bytes());

    println!("Session pubkey: {}", public_key);

    println!("\nFor .env:");
    println!("SESSION_SIGNING_KEY={}", private_key);

    // Same shape as session_keypair.json
    println!("\nFor session_keypair.json:");
    println!("{{\n  \"public_key\": \"{}\",\n  \"private_key\": \"{}\"\n}}", public_key, private_key);
}
