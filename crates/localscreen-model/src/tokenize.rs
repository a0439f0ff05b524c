use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

/// `<pad>` in the RoBERTa vocabularies.
pub const DEFAULT_PAD_ID: u32 = 1;

/// Encode `texts` into `[batch, width]` id and mask tensors, truncating each
/// row to `max_len` tokens and padding to the longest row.
pub fn tokenize_batch(tokenizer: &Tokenizer, texts: &[String], max_len: usize, device: &Device) -> Result<(Tensor, Tensor)> {
    let encodings = tokenizer
        .encode_batch(texts.to_vec(), true)
        .map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let pad_id = tokenizer.token_to_id("<pad>").unwrap_or(DEFAULT_PAD_ID);
    let rows: Vec<(Vec<u32>, Vec<u32>)> = encodings
        .iter()
        .map(|enc| truncate_row(enc.get_ids(), enc.get_attention_mask(), max_len))
        .collect();
    let width = rows.iter().map(|(ids, _)| ids.len()).max().unwrap_or(0).max(1);

    let mut ids = Vec::with_capacity(rows.len() * width);
    let mut mask = Vec::with_capacity(rows.len() * width);
    for (row_ids, row_mask) in rows {
        let pad = width - row_ids.len();
        ids.extend(row_ids);
        ids.extend(std::iter::repeat(pad_id).take(pad));
        mask.extend(row_mask);
        mask.extend(std::iter::repeat(0).take(pad));
    }
    let batch = texts.len();
    let input_ids = Tensor::from_vec(ids, (batch, width), device)?;
    let attention_mask = Tensor::from_vec(mask, (batch, width), device)?;
    Ok((input_ids, attention_mask))
}

/// Cut a row to `max_len` tokens, keeping its closing special token.
pub fn truncate_row(ids: &[u32], mask: &[u32], max_len: usize) -> (Vec<u32>, Vec<u32>) {
    let mut ids = ids.to_vec();
    let mut mask = mask.to_vec();
    if max_len > 1 && ids.len() > max_len {
        let last = ids[ids.len() - 1];
        ids.truncate(max_len);
        mask.truncate(max_len);
        ids[max_len - 1] = last;
    }
    (ids, mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_keeps_closing_token() {
        let (ids, mask) = truncate_row(&[0, 10, 11, 12, 13, 2], &[1; 6], 4);
        assert_eq!(ids, vec![0, 10, 11, 2]);
        assert_eq!(mask, vec![1; 4]);
    }

    #[test]
    fn short_rows_are_untouched() {
        let (ids, _) = truncate_row(&[0, 10, 2], &[1; 3], 96);
        assert_eq!(ids, vec![0, 10, 2]);
    }
}
