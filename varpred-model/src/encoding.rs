use ndarray::{Array2, Array3, ArrayView2, Axis};

use crate::error::{ModelError, Result};

/// Channel order of the one-hot encoding.
pub const ALPHABET: [u8; 4] = [b'A', b'C', b'G', b'T'];

pub const NUM_CHANNELS: usize = ALPHABET.len();

const NO_CHANNEL: u8 = u8::MAX;

/// A lookup table mapping ASCII bases (either case) to their channel. Everything
/// else, including `N` and IUPAC ambiguity codes, maps to no channel.
const CHANNEL_LOOKUP: [u8; 256] = {
    let mut arr = [NO_CHANNEL; 256];
    arr[b'A' as usize] = 0;
    arr[b'a' as usize] = 0;
    arr[b'C' as usize] = 1;
    arr[b'c' as usize] = 1;
    arr[b'G' as usize] = 2;
    arr[b'g' as usize] = 2;
    arr[b'T' as usize] = 3;
    arr[b't' as usize] = 3;
    arr
};

///
/// One-hot encode a sequence along the channel axis: shape `(len, 4)`, one
/// indicator column per base in `ACGT` order. Unknown bases are all zeros.
///
pub fn one_hot_encode(sequence: &str) -> Array2<f32> {
    let mut encoded = Array2::<f32>::zeros((sequence.len(), NUM_CHANNELS));
    for (i, base) in sequence.bytes().enumerate() {
        let channel = CHANNEL_LOOKUP[base as usize];
        if channel != NO_CHANNEL {
            encoded[[i, channel as usize]] = 1.0;
        }
    }
    encoded
}

///
/// Decode a one-hot matrix back into bases. Rows without a set channel decode to `N`.
///
pub fn one_hot_decode(encoded: ArrayView2<f32>) -> String {
    encoded
        .axis_iter(Axis(0))
        .map(|row| {
            row.iter()
                .position(|v| *v > 0.5)
                .map(|channel| ALPHABET[channel] as char)
                .unwrap_or('N')
        })
        .collect()
}

///
/// Encode and stack equally long sequences into a `(n, len, 4)` batch.
///
/// # Arguments
/// - sequences: the sequences to encode, all of length `length`
/// - length: the expected sequence length, used for the shape of an empty batch
pub fn encode_batch<S: AsRef<str>>(sequences: &[S], length: usize) -> Result<Array3<f32>> {
    let mut batch = Array3::<f32>::zeros((sequences.len(), length, NUM_CHANNELS));
    for (i, sequence) in sequences.iter().enumerate() {
        let sequence = sequence.as_ref();
        if sequence.len() != length {
            return Err(ModelError::RaggedBatch {
                expected: length,
                found: sequence.len(),
            });
        }
        batch
            .index_axis_mut(Axis(0), i)
            .assign(&one_hot_encode(sequence));
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_one_hot_encode() {
        let encoded = one_hot_encode("ACgTN");
        let expected = array![
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
            [0.0, 0.0, 0.0, 0.0],
        ];
        assert_eq!(encoded, expected);
    }

    #[rstest]
    #[case("GATTACA")]
    #[case("ACGTNNACGT")]
    #[case("")]
    fn test_encode_decode_round_trip(#[case] sequence: &str) {
        let encoded = one_hot_encode(sequence);
        assert_eq!(one_hot_decode(encoded.view()), sequence);
    }

    #[rstest]
    fn test_encode_batch() {
        let batch = encode_batch(&["ACGT", "TTTT"], 4).unwrap();
        assert_eq!(batch.shape(), &[2, 4, 4]);
        assert_eq!(one_hot_decode(batch.index_axis(Axis(0), 1)), "TTTT");
    }

    #[rstest]
    fn test_encode_empty_batch() {
        let batch = encode_batch::<&str>(&[], 10).unwrap();
        assert_eq!(batch.shape(), &[0, 10, 4]);
    }

    #[rstest]
    fn test_encode_ragged_batch() {
        assert!(matches!(
            encode_batch(&["ACGT", "ACG"], 4),
            Err(ModelError::RaggedBatch {
                expected: 4,
                found: 3
            })
        ));
    }
}
