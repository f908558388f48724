use tandem_core::SignalKind;

/// Last session description seen in a room plus the candidates trickled after it.
///
/// Frames are kept verbatim so late joiners receive exactly what the sender wrote.
#[derive(Debug, Default, Clone)]
pub struct HandshakeCache {
    description: Option<String>,
    candidates: Vec<String>,
}

impl HandshakeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one relayed frame into the cache.
    ///
    /// An Offer or Answer replaces everything, including cached candidates.
    /// Unknown frame types leave the cache untouched.
    pub fn record(&mut self, kind: SignalKind, frame: &str) {
        match kind {
            SignalKind::Offer | SignalKind::Answer => {
                self.description = Some(frame.to_owned());
                self.candidates.clear();
            }
            SignalKind::Candidate => self.candidates.push(frame.to_owned()),
            SignalKind::Other => {}
        }
    }

    /// Description first, then candidates in arrival order.
    pub fn replay(&self) -> impl Iterator<Item = &String> {
        self.description.iter().chain(self.candidates.iter())
    }

    pub fn len(&self) -> usize {
        usize::from(self.description.is_some()) + self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
