// ============================================================
// Data — ELMo Character Ids
// ============================================================
// The ELMo character CNN does not see token strings; it sees a
// fixed-width row of byte ids per token. This module performs
// that mapping for a whole batch.
//
// Per token (max 50 ids):
//
//   [BOW] b0 b1 ... bn [EOW] [PAD] [PAD] ... [PAD]
//
//   BOW = 258, EOW = 259, PAD = 260, bytes are raw UTF-8 (0..=255)
//   at most 48 bytes are kept so BOW and EOW always fit
//
// The sentence markers "<S>" and "</S>" map to the single
// characters 256 and 257 instead of their bytes.
//
// Finally every id is shifted by +1, which frees 0 to mean
// "no token here". Sentences shorter than the longest one in the
// batch are padded with all-zero rows.
//
// Reference: Peters et al. (2018), AllenNLP ELMoCharacterMapper

/// Width of one token's character-id row
pub const MAX_CHARS_PER_TOKEN: usize = 50;

pub const BOS_CHAR: i32 = 256;
pub const EOS_CHAR: i32 = 257;
pub const BOW_CHAR: i32 = 258;
pub const EOW_CHAR: i32 = 259;
pub const PAD_CHAR: i32 = 260;

pub const BOS_TOKEN: &str = "<S>";
pub const EOS_TOKEN: &str = "</S>";

/// Character ids of a single token, already shifted by +1.
pub fn token_to_ids(token: &str) -> [i32; MAX_CHARS_PER_TOKEN] {
    let mut ids = [PAD_CHAR; MAX_CHARS_PER_TOKEN];
    ids[0] = BOW_CHAR;

    let end = match token {
        BOS_TOKEN => {
            ids[1] = BOS_CHAR;
            2
        }
        EOS_TOKEN => {
            ids[1] = EOS_CHAR;
            2
        }
        _ => {
            let bytes = token.as_bytes();
            let n     = bytes.len().min(MAX_CHARS_PER_TOKEN - 2);
            for (slot, &b) in ids[1..=n].iter_mut().zip(bytes) {
                *slot = i32::from(b);
            }
            n + 1
        }
    };
    ids[end] = EOW_CHAR;

    for id in ids.iter_mut() {
        *id += 1;
    }
    ids
}

/// Character ids of a batch, flattened row-major as
/// [batch, max_len, MAX_CHARS_PER_TOKEN], plus that shape.
pub fn batch_to_ids(sentences: &[Vec<String>]) -> (Vec<i32>, [usize; 3]) {
    let batch   = sentences.len();
    let max_len = sentences.iter().map(Vec::len).max().unwrap_or(0);

    let mut flat = vec![0i32; batch * max_len * MAX_CHARS_PER_TOKEN];
    for (s, sentence) in sentences.iter().enumerate() {
        for (t, token) in sentence.iter().enumerate() {
            let start = (s * max_len + t) * MAX_CHARS_PER_TOKEN;
            flat[start..start + MAX_CHARS_PER_TOKEN].copy_from_slice(&token_to_ids(token));
        }
    }

    (flat, [batch, max_len, MAX_CHARS_PER_TOKEN])
}
