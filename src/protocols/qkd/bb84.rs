//! BB84 Quantum Key Distribution Protocol.
//!
//! The sender encodes random bits in randomly chosen bases, an optional eavesdropper
//! measures and resends every photon, and the receiver measures in bases of their own.
//! Positions where sender and receiver bases agree are kept ("sifting"); disagreements
//! between kept bits reveal the eavesdropper.
//!
//! The protocol is exposed both as discrete phases ([`generate_sender_data`],
//! [`transmit`], [`measure_receiver`], [`sift`], [`analyze`]) and as the single call
//! [`run_protocol`]. Randomness is drawn phase by phase, position by position.

use crate::{Basis, PolarizationState, RandomSource, errors::ProtocolError, measure, state_for};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Number of positions simulated when no length is given.
pub const DEFAULT_LENGTH: usize = 10;

/// Immutable per-run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of photons sent.
    pub length: usize,
    /// Whether an intercept-resend eavesdropper sits on the channel.
    pub eavesdropper_present: bool,
    /// Error rates strictly above this value classify the run as compromised.
    pub error_threshold: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            eavesdropper_present: false,
            error_threshold: 0.0,
        }
    }
}

impl RunConfig {
    pub fn new(length: usize) -> Self {
        Self {
            length,
            ..Self::default()
        }
    }

    pub fn with_eavesdropper(mut self, present: bool) -> Self {
        self.eavesdropper_present = present;
        self
    }

    /// Tolerated error rate before declaring compromise. Physical links have a nonzero
    /// error floor; the default of 0.0 treats any error as an attack.
    pub fn with_error_threshold(mut self, threshold: f64) -> Self {
        self.error_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.length == 0 {
            return Err(ProtocolError::InvalidLength(self.length));
        }
        if !(0.0..=1.0).contains(&self.error_threshold) {
            return Err(ProtocolError::InvalidThreshold(self.error_threshold));
        }
        Ok(())
    }
}

/// What the sender prepared at one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitRecord {
    pub bit: bool,
    pub basis: Basis,
    pub state: PolarizationState,
}

/// The eavesdropper's basis and the state they resent at one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterceptRecord {
    pub basis: Basis,
    pub state: PolarizationState,
}

/// The receiver's basis and measured outcome at one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub basis: Basis,
    pub state: PolarizationState,
    pub bit: bool,
}

/// Photons as they arrive at the receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transmission {
    /// In-transit state per position, after interception if any.
    pub states: Vec<PolarizationState>,
    /// Present only when an eavesdropper was on the channel.
    pub intercepts: Option<Vec<InterceptRecord>>,
}

impl Transmission {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Outcome of basis comparison at one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiftedRecord {
    /// Sender and receiver bases agreed.
    pub kept: bool,
    /// Receiver bit, retained only for kept positions.
    pub bit: Option<bool>,
    /// Kept position whose receiver bit differs from the sender's.
    pub is_error: bool,
}

impl SiftedRecord {
    pub fn discarded() -> Self {
        Self {
            kept: false,
            bit: None,
            is_error: false,
        }
    }
}

/// Security verdict derived from the sifted error rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Security {
    /// No position survived sifting.
    InsufficientData,
    Secure,
    Compromised,
}

/// Aggregate statistics of a sifted run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub sifted_count: usize,
    pub error_count: usize,
    /// `error_count / sifted_count`, or 0 when nothing was kept.
    pub error_rate: f64,
    pub security: Security,
}

/// Everything one protocol run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub config: RunConfig,
    pub sender: Vec<BitRecord>,
    pub intercepts: Option<Vec<InterceptRecord>>,
    pub receiver: Vec<MeasurementRecord>,
    pub sifted: Vec<SiftedRecord>,
    pub sifted_count: usize,
    pub error_count: usize,
    pub error_rate: f64,
    pub security: Security,
}

impl RunResult {
    /// Kept receiver bits, in position order.
    pub fn sifted_key(&self) -> Vec<bool> {
        self.sifted.iter().filter_map(|r| r.bit).collect()
    }

    /// Sifted key as a string of `0`/`1`, or `-` when empty.
    pub fn sifted_key_string(&self) -> String {
        let key: String = self
            .sifted_key()
            .into_iter()
            .map(|b| if b { '1' } else { '0' })
            .collect();
        if key.is_empty() { "-".to_string() } else { key }
    }

    /// Quantum bit error rate in percent.
    pub fn qber_percent(&self) -> f64 {
        self.error_rate * 100.0
    }

    /// Number of photons the eavesdropper measured.
    pub fn intercepted_count(&self) -> usize {
        self.intercepts.as_ref().map_or(0, Vec::len)
    }

    /// One-line status report of the run.
    pub fn summary(&self) -> String {
        let head = format!("Sifting complete. Key length: {}.", self.sifted_count);
        match self.security {
            Security::InsufficientData => {
                format!("{head} No matching bases, no key could be established.")
            }
            Security::Secure => format!("{head} No errors detected. Channel secure."),
            Security::Compromised => format!(
                "{head} WARNING: {} errors detected in matching bases! An eavesdropper might be listening.",
                self.error_count
            ),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Draws a bit and a basis per position and encodes them.
pub fn generate_sender_data<R: RandomSource + ?Sized>(
    length: usize,
    rng: &mut R,
) -> Result<Vec<BitRecord>, ProtocolError> {
    if length == 0 {
        return Err(ProtocolError::InvalidLength(length));
    }

    let mut records = Vec::with_capacity(length);
    for _ in 0..length {
        let bit = rng.next_bool()?;
        let basis = Basis::from_bool(rng.next_bool()?);
        records.push(BitRecord {
            bit,
            basis,
            state: state_for(bit, basis),
        });
    }

    debug!(length, "sender prepared photons");
    Ok(records)
}

/// Sends the sender's photons over the channel.
///
/// With an eavesdropper, every photon is measured in a random basis and the measured
/// state, not the original, continues to the receiver.
pub fn transmit<R: RandomSource + ?Sized>(
    sender: &[BitRecord],
    eavesdropper_present: bool,
    rng: &mut R,
) -> Result<Transmission, ProtocolError> {
    let mut states: Vec<PolarizationState> = sender.iter().map(|r| r.state).collect();

    if !eavesdropper_present {
        debug!(photons = states.len(), "photons transmitted");
        return Ok(Transmission {
            states,
            intercepts: None,
        });
    }

    let mut intercepts = Vec::with_capacity(states.len());
    for in_transit in states.iter_mut() {
        let basis = Basis::from_bool(rng.next_bool()?);
        let state = measure(*in_transit, basis, rng)?;
        *in_transit = state;
        intercepts.push(InterceptRecord { basis, state });
    }

    debug!(photons = states.len(), "photons intercepted and resent");
    Ok(Transmission {
        states,
        intercepts: Some(intercepts),
    })
}

/// Receiver picks a basis per position and measures the incoming photon.
pub fn measure_receiver<R: RandomSource + ?Sized>(
    transmission: &Transmission,
    rng: &mut R,
) -> Result<Vec<MeasurementRecord>, ProtocolError> {
    let mut records = Vec::with_capacity(transmission.len());
    for &incoming in &transmission.states {
        let basis = Basis::from_bool(rng.next_bool()?);
        let state = measure(incoming, basis, rng)?;
        records.push(MeasurementRecord {
            basis,
            state,
            bit: state.bit(),
        });
    }

    debug!(photons = records.len(), "receiver measured photons");
    Ok(records)
}

/// Compares bases position by position, keeping only the matches.
pub fn sift(
    sender: &[BitRecord],
    receiver: &[MeasurementRecord],
) -> Result<Vec<SiftedRecord>, ProtocolError> {
    if sender.len() != receiver.len() {
        return Err(ProtocolError::LengthMismatch {
            expected: sender.len(),
            got: receiver.len(),
        });
    }

    let sifted = sender
        .iter()
        .zip(receiver)
        .map(|(s, r)| {
            if s.basis == r.basis {
                SiftedRecord {
                    kept: true,
                    bit: Some(r.bit),
                    is_error: s.bit != r.bit,
                }
            } else {
                SiftedRecord::discarded()
            }
        })
        .collect();

    Ok(sifted)
}

/// Classifies a run from its sifted count and error rate.
pub fn classify(sifted_count: usize, error_rate: f64, threshold: f64) -> Security {
    if sifted_count == 0 {
        Security::InsufficientData
    } else if error_rate > threshold {
        Security::Compromised
    } else {
        Security::Secure
    }
}

/// Counts kept positions and errors and derives the security verdict.
pub fn analyze(sifted: &[SiftedRecord], threshold: f64) -> Analysis {
    let sifted_count = sifted.iter().filter(|r| r.kept).count();
    let error_count = sifted.iter().filter(|r| r.kept && r.is_error).count();

    let error_rate = if sifted_count > 0 {
        error_count as f64 / sifted_count as f64
    } else {
        0.0
    };

    Analysis {
        sifted_count,
        error_count,
        error_rate,
        security: classify(sifted_count, error_rate, threshold),
    }
}

/// Runs BB84 end to end.
pub fn run_protocol<R: RandomSource + ?Sized>(
    config: &RunConfig,
    rng: &mut R,
) -> Result<RunResult, ProtocolError> {
    config.validate()?;

    let sender = generate_sender_data(config.length, rng)?;
    let transmission = transmit(&sender, config.eavesdropper_present, rng)?;
    let receiver = measure_receiver(&transmission, rng)?;
    let sifted = sift(&sender, &receiver)?;
    let analysis = analyze(&sifted, config.error_threshold);

    info!(
        length = config.length,
        eavesdropper = config.eavesdropper_present,
        sifted = analysis.sifted_count,
        errors = analysis.error_count,
        security = ?analysis.security,
        "BB84 run complete"
    );
    if analysis.security == Security::Compromised {
        warn!(
            error_rate = analysis.error_rate,
            "errors in matching bases, channel compromised"
        );
    }

    Ok(RunResult {
        config: config.clone(),
        sender,
        intercepts: transmission.intercepts,
        receiver,
        sifted,
        sifted_count: analysis.sifted_count,
        error_count: analysis.error_count,
        error_rate: analysis.error_rate,
        security: analysis.security,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptedSource;
    use crate::errors::RandomError;
    use pretty_assertions::assert_eq;

    fn sent(bit: bool, basis: Basis) -> BitRecord {
        BitRecord {
            bit,
            basis,
            state: state_for(bit, basis),
        }
    }

    fn received(bit: bool, basis: Basis) -> MeasurementRecord {
        MeasurementRecord {
            basis,
            state: state_for(bit, basis),
            bit,
        }
    }

    #[test]
    fn config_validation() {
        assert_eq!(RunConfig::default().validate(), Ok(()));
        assert_eq!(
            RunConfig::new(0).validate(),
            Err(ProtocolError::InvalidLength(0))
        );
        assert_eq!(
            RunConfig::new(4).with_error_threshold(1.5).validate(),
            Err(ProtocolError::InvalidThreshold(1.5))
        );
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: RunConfig = serde_json::from_str(r#"{"eavesdropper_present": true}"#).unwrap();
        assert_eq!(cfg, RunConfig::default().with_eavesdropper(true));
    }

    #[test]
    fn sift_keeps_matching_bases_only() {
        let sender = [
            sent(false, Basis::Rectilinear),
            sent(true, Basis::Diagonal),
            sent(true, Basis::Rectilinear),
        ];
        let receiver = [
            received(false, Basis::Rectilinear),
            received(false, Basis::Rectilinear),
            received(false, Basis::Rectilinear),
        ];

        let sifted = sift(&sender, &receiver).unwrap();
        assert_eq!(
            sifted,
            vec![
                SiftedRecord {
                    kept: true,
                    bit: Some(false),
                    is_error: false
                },
                SiftedRecord::discarded(),
                SiftedRecord {
                    kept: true,
                    bit: Some(false),
                    is_error: true
                },
            ]
        );

        let analysis = analyze(&sifted, 0.0);
        assert_eq!(analysis.sifted_count, 2);
        assert_eq!(analysis.error_count, 1);
        assert_eq!(analysis.error_rate, 0.5);
        assert_eq!(analysis.security, Security::Compromised);
    }

    #[test]
    fn sift_rejects_length_mismatch() {
        let err = sift(&[sent(true, Basis::Diagonal)], &[]).unwrap_err();
        assert_eq!(err, ProtocolError::LengthMismatch { expected: 1, got: 0 });
    }

    #[test]
    fn empty_sift_is_insufficient_data() {
        let analysis = analyze(&[SiftedRecord::discarded(); 3], 0.0);
        assert_eq!(analysis.sifted_count, 0);
        assert_eq!(analysis.error_rate, 0.0);
        assert_eq!(analysis.security, Security::InsufficientData);
    }

    #[test]
    fn threshold_tolerates_low_error_rates() {
        assert_eq!(classify(10, 0.1, 0.0), Security::Compromised);
        assert_eq!(classify(10, 0.1, 0.11), Security::Secure);
        assert_eq!(classify(10, 0.0, 0.0), Security::Secure);
        assert_eq!(classify(0, 0.0, 0.5), Security::InsufficientData);
    }

    #[test]
    fn transmit_without_eavesdropper_draws_nothing() {
        let sender = [sent(true, Basis::Diagonal), sent(false, Basis::Rectilinear)];
        let mut src = ScriptedSource::default();
        let transmission = transmit(&sender, false, &mut src).unwrap();
        assert_eq!(transmission.intercepts, None);
        assert_eq!(
            transmission.states,
            vec![PolarizationState::Minus45, PolarizationState::Horizontal]
        );
    }

    #[test]
    fn intercepted_state_replaces_original() {
        // Eve measures V in the diagonal basis and collapses it to +45.
        let sender = [sent(true, Basis::Rectilinear)];
        let mut src = ScriptedSource::from_bits("1 0");
        let transmission = transmit(&sender, true, &mut src).unwrap();
        assert_eq!(transmission.states, vec![PolarizationState::Plus45]);
        assert_eq!(
            transmission.intercepts,
            Some(vec![InterceptRecord {
                basis: Basis::Diagonal,
                state: PolarizationState::Plus45
            }])
        );
    }

    #[test]
    fn run_fails_fast_on_exhausted_source() {
        let mut src = ScriptedSource::from_bits("0101");
        let err = run_protocol(&RunConfig::new(4), &mut src).unwrap_err();
        assert!(matches!(err, ProtocolError::Random(_)));
    }

    struct Unplugged;

    impl RandomSource for Unplugged {
        fn next_bool(&mut self) -> Result<bool, RandomError> {
            Err(RandomError::Unavailable("hardware RNG unplugged".into()))
        }
    }

    #[test]
    fn unavailable_source_is_reported() {
        let err = run_protocol(&RunConfig::default(), &mut Unplugged).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::Random(RandomError::Unavailable("hardware RNG unplugged".into()))
        );
    }

    #[test]
    fn summary_reports_errors() {
        // Sender H; receiver measures in rectilinear but sees V after Eve's collapse.
        let mut src = ScriptedSource::from_bits("00 1 1 0 1");
        let cfg = RunConfig::new(1).with_eavesdropper(true);
        let result = run_protocol(&cfg, &mut src).unwrap();
        assert_eq!(result.security, Security::Compromised);
        assert_eq!(result.intercepted_count(), 1);
        assert_eq!(result.sifted_key_string(), "1");
        assert_eq!(result.qber_percent(), 100.0);
        assert!(result.summary().contains("WARNING: 1 errors"));
    }
}
