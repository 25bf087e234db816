use sodiumbox::{Algorithm, AlgorithmRegistry, CryptoBox, Nonce};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    sodiumbox::init()?;

    // Generate keypairs for two parties
    let alice = CryptoBox::generate();
    let bob = CryptoBox::generate();
    let alice_public = alice.public_key().to_base64();
    let bob_public = bob.public_key().to_base64();

    // Anyone holding Bob's public key can seal a message to him
    let bob_encrypt_only = CryptoBox::new(&bob_public, None)?;
    let mut registry = AlgorithmRegistry::new();
    registry.add_algorithm(bob_encrypt_only, "bob", true);
    let cipher = registry.encrypt(b"I have a secret for you", None, None)?;
    assert_eq!(b"I have a secret for you".to_vec(), bob.decrypt(&cipher, None, None)?);

    // Alice authenticates a message to Bob with a fresh nonce
    let nonce = Nonce::gen();
    let cipher = alice
        .for_recipient(&bob_public)?
        .encrypt(b"Signed, Alice", Some(&nonce), None)?;
    let plain = bob
        .from_sender(&alice_public)?
        .decrypt(&cipher, Some(&nonce), None)?;
    assert_eq!(b"Signed, Alice".to_vec(), plain);

    Ok(())
}
