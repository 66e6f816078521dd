//! # Transaction Envelopes
//!
//! Legacy (pre-typed) transaction envelopes with EIP-155 replay protection.
//!
//! ```text
//! signing payload = rlp([nonce, gasPrice, gas, to, value, data, chainId, 0, 0])
//! signed envelope = rlp([nonce, gasPrice, gas, to, value, data, v, r, s])
//! v               = recovery_id + 35 + 2 * chainId
//! ```

use rlp::RlpStream;
use shared_crypto::{Credential, CryptoError};
use shared_types::{keccak256, SignedTransaction, TxHash, UnsignedTransaction, U256};

fn append_fields(stream: &mut RlpStream, tx: &UnsignedTransaction) {
    stream.append(&tx.nonce);
    stream.append(&tx.gas_price);
    stream.append(&tx.gas_limit);
    match &tx.to {
        Some(to) => stream.append(&to.as_bytes().to_vec()),
        None => stream.append_empty_data(),
    };
    stream.append(&tx.value);
    stream.append(&tx.data);
}

/// RLP payload whose hash the sender signs.
pub fn signing_payload(tx: &UnsignedTransaction) -> Vec<u8> {
    let mut stream = RlpStream::new_list(9);
    append_fields(&mut stream, tx);
    stream.append(&tx.chain_id);
    stream.append(&0u8);
    stream.append(&0u8);
    stream.out().to_vec()
}

/// Keccak-256 of [`signing_payload`].
pub fn signing_hash(tx: &UnsignedTransaction) -> [u8; 32] {
    keccak256(&signing_payload(tx))
}

/// Serialized signed envelope as broadcast to the node.
pub fn encode_signed(tx: &UnsignedTransaction, v: u64, r: &[u8; 32], s: &[u8; 32]) -> Vec<u8> {
    let mut stream = RlpStream::new_list(9);
    append_fields(&mut stream, tx);
    stream.append(&v);
    // r and s are scalars: leading zero bytes are stripped.
    stream.append(&U256::from_big_endian(r));
    stream.append(&U256::from_big_endian(s));
    stream.out().to_vec()
}

/// Sign `tx` with `credential`.
///
/// The credential only ever sees the 32-byte digest.
pub fn sign_transaction(
    tx: UnsignedTransaction,
    credential: &dyn Credential,
) -> Result<SignedTransaction, CryptoError> {
    let signature = credential.sign_prehash(&signing_hash(&tx))?;
    let v = u64::from(signature.recovery_id) + 35 + 2 * tx.chain_id;
    let raw = encode_signed(&tx, v, &signature.r, &signature.s);
    Ok(SignedTransaction {
        sender: credential.address(),
        hash: TxHash::of(&raw),
        v,
        r: signature.r,
        s: signature.s,
        raw,
        unsigned: tx,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::{recover_address, LocalKeyCredential, RecoverableSignature};

    // Worked example from EIP-155.
    fn eip155_example() -> UnsignedTransaction {
        UnsignedTransaction {
            nonce: 9,
            gas_price: U256::from(20_000_000_000u64),
            gas_limit: 21_000,
            to: Some("0x3535353535353535353535353535353535353535".parse().unwrap()),
            value: U256::from(1_000_000_000_000_000_000u64),
            data: Vec::new(),
            chain_id: 1,
        }
    }

    fn eip155_key() -> LocalKeyCredential {
        LocalKeyCredential::from_hex(
            "0x4646464646464646464646464646464646464646464646464646464646464646",
        )
        .unwrap()
    }

    #[test]
    fn test_signing_payload_matches_eip155() {
        let tx = eip155_example();
        assert_eq!(
            hex::encode(signing_payload(&tx)),
            "ec098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a764000080018080"
        );
        assert_eq!(
            hex::encode(signing_hash(&tx)),
            "daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        );
    }

    #[test]
    fn test_signed_envelope_matches_eip155() {
        let signed = sign_transaction(eip155_example(), &eip155_key()).unwrap();
        assert_eq!(signed.v, 37);
        assert_eq!(
            hex::encode(&signed.raw),
            concat!(
                "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a7640000",
                "8025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276",
                "a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
            )
        );
        assert_eq!(signed.hash, TxHash::of(&signed.raw));
    }

    #[test]
    fn test_sender_recoverable_from_envelope() {
        let credential = eip155_key();
        let mut tx = eip155_example();
        tx.chain_id = 42220;
        tx.data = vec![0xde, 0xad, 0xbe, 0xef];
        let signed = sign_transaction(tx.clone(), &credential).unwrap();

        let recovery_id = u8::try_from(signed.v - 35 - 2 * tx.chain_id).unwrap();
        let signature = RecoverableSignature {
            r: signed.r,
            s: signed.s,
            recovery_id,
        };
        let recovered = recover_address(&signing_hash(&tx), &signature).unwrap();
        assert_eq!(recovered, credential.address());
        assert_eq!(signed.sender, credential.address());
    }

    #[test]
    fn test_contract_creation_has_empty_to() {
        let mut tx = eip155_example();
        tx.to = None;
        let payload = signing_payload(&tx);
        // 0x80 is the RLP empty string standing in for the destination.
        let pos = 1 + 1 + 1 + 5 + 3;
        assert_eq!(payload[pos], 0x80);
        assert_ne!(signing_hash(&tx), signing_hash(&eip155_example()));
    }
}
