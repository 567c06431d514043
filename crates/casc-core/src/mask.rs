//! Mask compilation: raw guess -> searchable template

use crate::constants::{ALPHABET_SIZE, MAX_MIRRORED_WILDCARDS, MAX_WILDCARDS, WILDCARD};
use crate::jenkins::padded_len;
use crate::MaskError;

/// Normalise a path or mask: trim, canonical separator, ASCII upper-case.
///
/// Non-ASCII characters are left untouched so the byte length never changes.
pub fn normalise(raw: &str) -> String {
    raw.trim().replace('/', "\\").to_ascii_uppercase()
}

/// A compiled, immutable mask.
///
/// `template` is the normalised mask zero-padded to a multiple of 12 bytes;
/// `offsets` only ever index the unpadded prefix of length `len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    text: String,
    template: Vec<u8>,
    len: usize,
    offsets: Vec<usize>,
    mirrored: bool,
}

impl Mask {
    /// Compile a raw mask.
    ///
    /// In mirrored mode the wildcard list is split in two halves and
    /// interleaved so that pair `(i, k/2 + i)` lands at `(2i, 2i + 1)`.
    pub fn compile(raw: &str, mirrored: bool) -> Result<Self, MaskError> {
        let trimmed = raw.trim();
        if !trimmed.is_ascii() {
            return Err(MaskError::NonAscii {
                mask: trimmed.to_string(),
            });
        }

        let text = normalise(trimmed);

        let bytes = text.as_bytes();
        let mut offsets: Vec<usize> = bytes
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b == WILDCARD)
            .map(|(i, _)| i)
            .collect();

        let max = if mirrored {
            MAX_MIRRORED_WILDCARDS
        } else {
            MAX_WILDCARDS
        };
        if offsets.len() > max {
            return Err(MaskError::TooManyWildcards {
                count: offsets.len(),
                max,
                mask: text,
            });
        }

        if mirrored {
            if offsets.len() % 2 != 0 {
                return Err(MaskError::OddMirroredWildcards {
                    count: offsets.len(),
                    mask: text,
                });
            }
            offsets = interleave(&offsets);
        }

        let len = bytes.len();
        let mut template = bytes.to_vec();
        template.resize(padded_len(len), 0);

        Ok(Self {
            text,
            template,
            len,
            offsets,
            mirrored,
        })
    }

    /// Normalised mask text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Template bytes, zero-padded to a multiple of the block size
    pub fn template(&self) -> &[u8] {
        &self.template
    }

    /// Unpadded template length
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Wildcard byte offsets, interleaved when mirrored
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    /// Number of `%` markers in the mask
    pub fn wildcard_count(&self) -> usize {
        self.offsets.len()
    }

    /// Number of independently enumerated digits
    pub fn effective_wildcards(&self) -> usize {
        if self.mirrored {
            self.offsets.len() / 2
        } else {
            self.offsets.len()
        }
    }

    /// Offsets written by digit `digit` (one, or a mirrored pair)
    pub fn digit_offsets(&self, digit: usize) -> &[usize] {
        if self.mirrored {
            &self.offsets[digit * 2..digit * 2 + 2]
        } else {
            &self.offsets[digit..digit + 1]
        }
    }

    /// Weight of each digit, most significant first
    pub(crate) fn radix_weights(&self) -> impl Iterator<Item = u64> + '_ {
        let digits = self.effective_wildcards();
        (0..digits).map(move |d| ALPHABET_SIZE.pow((digits - 1 - d) as u32))
    }
}

fn interleave(offsets: &[usize]) -> Vec<usize> {
    let half = offsets.len() / 2;
    let mut out = Vec::with_capacity(offsets.len());
    for i in 0..half {
        out.push(offsets[i]);
        out.push(offsets[half + i]);
    }
    out
}

impl std::fmt::Display for Mask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
