use crate::traits::SpeechRecognizer;
use crate::DictationError;

/// Speech input is optional; without it the controller is text-only.
pub enum VoiceCapability {
    Available(Box<dyn SpeechRecognizer + Send>),
    Unavailable,
}

impl VoiceCapability {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub(crate) fn start(&mut self) -> Result<(), DictationError> {
        match self {
            Self::Available(recognizer) => recognizer.start(),
            Self::Unavailable => Err(DictationError::Unavailable),
        }
    }

    pub(crate) fn stop(&mut self) -> Result<(), DictationError> {
        match self {
            Self::Available(recognizer) => recognizer.stop(),
            Self::Unavailable => Err(DictationError::Unavailable),
        }
    }
}

impl std::fmt::Debug for VoiceCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available(_) => f.write_str("VoiceCapability::Available"),
            Self::Unavailable => f.write_str("VoiceCapability::Unavailable"),
        }
    }
}
