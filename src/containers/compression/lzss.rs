//! Sliding-window LZSS decompression.
//!
//! Most engines ship a variant of Okumura's `lzss.c` with one or more constants changed, so the
//! dictionary size, starting cursor, minimum match length and descriptor layout are all
//! parameters. Output size always comes from the archive's entry table; the stream itself has no
//! terminator.

/// How the two descriptor bytes of a back-reference split into position and count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DescriptorLayout {
    /// `PPPPPPPP PPPPCCCC`: 12-bit position in the high bits, count in the low nibble.
    PositionHigh,
    /// `pppppppp PPPPCCCC`: low position byte first, then the high position nibble and the count
    /// (the layout of Okumura's `lzss.c`).
    PositionLowFirst,
}

impl DescriptorLayout {
    /// Returns `(look_behind_position, count_nibble)`.
    fn split(self, first: u8, second: u8) -> (usize, usize) {
        let count = (second & 0x0F) as usize;
        let position = match self {
            DescriptorLayout::PositionHigh => (((first as usize) << 8) | second as usize) >> 4,
            DescriptorLayout::PositionLowFirst => {
                first as usize | (((second & 0xF0) as usize) << 4)
            }
        };
        (position, count)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LzssSettings {
    pub dictionary_size: usize,
    pub initial_position: usize,
    pub min_match_length: usize,
    pub layout: DescriptorLayout,
}

impl LzssSettings {
    /// Constants of the reference `lzss.c` implementation.
    pub const OKUMURA: LzssSettings = LzssSettings {
        dictionary_size: 0x1000,
        initial_position: 0xFEE,
        min_match_length: 3,
        layout: DescriptorLayout::PositionLowFirst,
    };
}

impl Default for LzssSettings {
    fn default() -> Self {
        LzssSettings {
            dictionary_size: 0x1000,
            initial_position: 1,
            min_match_length: 2,
            layout: DescriptorLayout::PositionHigh,
        }
    }
}

/// Decompresses `input` into exactly `output_size` bytes.
///
/// Decoding stops when the output is full or the input runs dry. A short input leaves the tail of
/// the output zeroed instead of failing; several shipped archives rely on this.
pub fn decompress(input: &[u8], output_size: usize, settings: &LzssSettings) -> Vec<u8> {
    let dict_size = settings.dictionary_size.max(1);
    let mut dict = vec![0u8; dict_size];
    let mut dict_pos = settings.initial_position % dict_size;

    let mut output = vec![0u8; output_size];
    let mut out_pos = 0;
    let mut in_pos = 0;

    // High byte counts how many control bits are left
    let mut control: u16 = 0;

    while out_pos < output_size && in_pos < input.len() {
        control >>= 1;
        if control & 0x100 == 0 {
            control = input[in_pos] as u16 | 0xFF00;
            in_pos += 1;
        }

        if control & 1 != 0 {
            let Some(&byte) = input.get(in_pos) else {
                break;
            };
            in_pos += 1;

            output[out_pos] = byte;
            out_pos += 1;
            dict[dict_pos] = byte;
            dict_pos = (dict_pos + 1) % dict_size;
            continue;
        }

        let (Some(&first), Some(&second)) = (input.get(in_pos), input.get(in_pos + 1)) else {
            break;
        };
        in_pos += 2;

        let (position, count) = settings.layout.split(first, second);
        let mut look_behind = position % dict_size;
        let count = count + settings.min_match_length;

        for _ in 0..count {
            if out_pos >= output_size {
                break;
            }
            let byte = dict[look_behind];
            output[out_pos] = byte;
            out_pos += 1;
            dict[dict_pos] = byte;
            dict_pos = (dict_pos + 1) % dict_size;
            look_behind = (look_behind + 1) % dict_size;
        }
    }

    if out_pos < output_size {
        log::warn!(
            "LZSS input exhausted after {} of {} bytes, zero-padding the rest",
            out_pos,
            output_size
        );
    }

    output
}
