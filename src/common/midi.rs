use core::fmt;
use micromath::F32Ext;

const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Converts a frequency in Hz to a [MIDI](https://en.wikipedia.org/wiki/MIDI) note number (with a fractional part).
pub fn freq_to_midi_note(freq: f32) -> f32 {
    12.0 * F32Ext::log2(freq) - 36.376316562295926
}

/// Returns the MIDI note number closest to a given frequency in Hz.
pub fn nearest_midi_note(freq: f32) -> i32 {
    F32Ext::round(freq_to_midi_note(freq)) as i32
}

/// Returns true if the given MIDI note falls on a black piano key.
pub fn is_black_key(midi_note: i32) -> bool {
    matches!(midi_note.rem_euclid(12), 1 | 3 | 6 | 8 | 10)
}

/// The name of the note closest to a (fractional) MIDI note number,
/// along with the deviation from that note in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteName {
    /// The nearest MIDI note number.
    pub midi_note: i32,
    /// The offset from `midi_note` in cents, in the range [-50, 50].
    pub cents: i32,
}

impl NoteName {
    /// The pitch class name, for example `"C#"`.
    pub fn pitch_class(&self) -> &'static str {
        PITCH_CLASS_NAMES[self.midi_note.rem_euclid(12) as usize]
    }

    /// The octave number, using the convention where MIDI note 60 is C4.
    pub fn octave(&self) -> i32 {
        self.midi_note.div_euclid(12) - 1
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} {:+} cents", self.pitch_class(), self.octave(), self.cents)
    }
}

/// Returns the name of the note closest to a fractional MIDI note number.
pub fn note_name(midi_note: f32) -> NoteName {
    let nearest = F32Ext::round(midi_note);
    NoteName {
        midi_note: nearest as i32,
        cents: F32Ext::round(100.0 * (midi_note - nearest)) as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn text_approximate_note_number() {
        // The hz to midi note conversion relies on the approximate log2
        // function of the micromath crate. This test compares this
        // approximation to std's log2 and makes sure the difference
        // is acceptable.

        // The maximum acceptable error in cents. 0.1 is 1/1000th of a semitone.
        let max_cent_error = 0.11_f32;
        for i in 1..10000 {
            let f = i as f32;
            let actual_note_number = 12.0 * (f / 440.0).log2() + 69.0;
            let approx_note_number = freq_to_midi_note(f);
            let delta_cents = 100. * (actual_note_number - approx_note_number);
            assert!(delta_cents.abs() <= max_cent_error);
        }
    }

    #[test]
    fn test_nearest_note() {
        assert_eq!(nearest_midi_note(440.0), 69);
        assert_eq!(nearest_midi_note(261.63), 60);
        assert_eq!(nearest_midi_note(65.41), 36);
    }

    #[test]
    fn test_black_keys() {
        let black: [i32; 5] = [61, 63, 66, 68, 70];
        for note in 60..72 {
            assert_eq!(is_black_key(note), black.contains(&note));
        }
        assert!(is_black_key(-11));
    }

    #[test]
    fn test_note_name() {
        let a4 = note_name(69.0);
        assert_eq!(a4.pitch_class(), "A");
        assert_eq!(a4.octave(), 4);
        assert_eq!(a4.cents, 0);
        assert_eq!(a4.to_string(), "A4 +0 cents");

        let sharp_c4 = note_name(60.25);
        assert_eq!(sharp_c4.midi_note, 60);
        assert_eq!(sharp_c4.cents, 25);
        assert_eq!(sharp_c4.to_string(), "C4 +25 cents");

        let flat_c2 = note_name(35.8);
        assert_eq!(flat_c2.midi_note, 36);
        assert_eq!(flat_c2.cents, -20);
        assert_eq!(flat_c2.octave(), 2);
    }
}
