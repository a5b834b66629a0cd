use crate::block::Block;

/// True iff `candidate` directly extends `prev`.
pub fn is_valid_link(prev: &Block, candidate: &Block) -> bool {
    candidate.prev_hash == prev.hash && candidate.index == prev.index + 1
}

/// True iff `chain` starts at the canonical genesis block and every block
/// links to, and hashes consistently after, its predecessor.
pub fn chain_is_valid(chain: &[Block]) -> bool {
    match chain.first() {
        Some(first) if first.is_genesis() => {}
        _ => return false,
    }
    chain
        .windows(2)
        .all(|pair| is_valid_link(&pair[0], &pair[1]) && pair[1].verify())
}

/// Describe every violation in `chain`. Empty when the chain is valid.
pub fn validate_chain(chain: &[Block]) -> Vec<String> {
    let mut errors = Vec::new();
    match chain.first() {
        None => {
            errors.push("chain is empty".to_string());
            return errors;
        }
        Some(first) if !first.is_genesis() => {
            errors.push("first block is not the canonical genesis block".to_string());
        }
        Some(_) => {}
    }

    for pair in chain.windows(2) {
        let (prev, b) = (&pair[0], &pair[1]);
        if b.prev_hash != prev.hash {
            errors.push(format!("block {} prev_hash mismatch", b.index));
        }
        if b.index != prev.index + 1 {
            errors.push(format!(
                "block {} follows block {} out of sequence",
                b.index, prev.index
            ));
        }
        if !b.verify() {
            errors.push(format!("block {} hash mismatch", b.index));
        }
    }
    errors
}
