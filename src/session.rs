//! Guided, step-by-step BB84 session.
//!
//! A [`Session`] walks the protocol one phase at a time so a front end can pause and
//! display each table before moving on:
//!
//! `Idle -> SenderGenerated -> Transmitted -> ReceiverMeasured -> Sifted`
//!
//! [`Session::reset`] returns to `Idle` from anywhere. Changing the eavesdropper flag or
//! the run length always resets first, so a run never mixes two configurations.

use crate::RandomSource;
use crate::errors::{ProtocolError, SessionError};
use crate::protocols::bb84::{
    self, BitRecord, MeasurementRecord, RunConfig, RunResult, Transmission,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Idle,
    SenderGenerated,
    Transmitted,
    ReceiverMeasured,
    Sifted,
}

impl Stage {
    /// Status line shown to the user for this stage.
    pub fn description(self) -> &'static str {
        match self {
            Stage::Idle => "Ready to start.",
            Stage::SenderGenerated => "Sender has prepared their photons.",
            Stage::Transmitted => "Photons received. Receiver needs to measure.",
            Stage::ReceiverMeasured => "Receiver has measured the photons.",
            Stage::Sifted => "Sifting complete.",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    config: RunConfig,
    stage: Stage,
    sender: Option<Vec<BitRecord>>,
    transmission: Option<Transmission>,
    receiver: Option<Vec<MeasurementRecord>>,
    result: Option<RunResult>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(RunConfig::default())
    }
}

impl Session {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            stage: Stage::Idle,
            sender: None,
            transmission: None,
            receiver: None,
            result: None,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Status text; after sifting this is the run summary.
    pub fn status(&self) -> String {
        match &self.result {
            Some(result) => result.summary(),
            None => self.stage.description().to_string(),
        }
    }

    pub fn sender(&self) -> Option<&[BitRecord]> {
        self.sender.as_deref()
    }

    pub fn transmission(&self) -> Option<&Transmission> {
        self.transmission.as_ref()
    }

    pub fn receiver(&self) -> Option<&[MeasurementRecord]> {
        self.receiver.as_deref()
    }

    /// Final result, available once the session has been sifted.
    pub fn result(&self) -> Option<&RunResult> {
        self.result.as_ref()
    }

    fn expect_stage(&self, expected: Stage, action: &'static str) -> Result<(), SessionError> {
        if self.stage != expected {
            return Err(SessionError::InvalidTransition {
                stage: self.stage,
                action,
            });
        }
        Ok(())
    }

    fn advance(&mut self, next: Stage) {
        debug!(from = ?self.stage, to = ?next, "session advanced");
        self.stage = next;
    }

    pub fn generate_sender<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<&[BitRecord], SessionError> {
        self.expect_stage(Stage::Idle, "generate sender data")?;
        self.config.validate()?;

        let records = bb84::generate_sender_data(self.config.length, rng)?;
        self.advance(Stage::SenderGenerated);
        Ok(self.sender.insert(records).as_slice())
    }

    pub fn transmit<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<&Transmission, SessionError> {
        self.expect_stage(Stage::SenderGenerated, "transmit photons")?;
        let Some(sender) = self.sender.as_deref() else {
            return Err(SessionError::InvalidTransition {
                stage: self.stage,
                action: "transmit photons",
            });
        };

        let transmission = bb84::transmit(sender, self.config.eavesdropper_present, rng)?;
        self.advance(Stage::Transmitted);
        Ok(&*self.transmission.insert(transmission))
    }

    pub fn measure_receiver<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<&[MeasurementRecord], SessionError> {
        self.expect_stage(Stage::Transmitted, "measure photons")?;
        let Some(transmission) = self.transmission.as_ref() else {
            return Err(SessionError::InvalidTransition {
                stage: self.stage,
                action: "measure photons",
            });
        };

        let records = bb84::measure_receiver(transmission, rng)?;
        self.advance(Stage::ReceiverMeasured);
        Ok(self.receiver.insert(records).as_slice())
    }

    pub fn sift(&mut self) -> Result<&RunResult, SessionError> {
        self.expect_stage(Stage::ReceiverMeasured, "compare bases")?;
        let (Some(sender), Some(transmission), Some(receiver)) =
            (&self.sender, &self.transmission, &self.receiver)
        else {
            return Err(SessionError::InvalidTransition {
                stage: self.stage,
                action: "compare bases",
            });
        };

        let sifted = bb84::sift(sender, receiver)?;
        let analysis = bb84::analyze(&sifted, self.config.error_threshold);
        let result = RunResult {
            config: self.config.clone(),
            sender: sender.clone(),
            intercepts: transmission.intercepts.clone(),
            receiver: receiver.clone(),
            sifted,
            sifted_count: analysis.sifted_count,
            error_count: analysis.error_count,
            error_rate: analysis.error_rate,
            security: analysis.security,
        };

        self.advance(Stage::Sifted);
        Ok(&*self.result.insert(result))
    }

    /// Drops all records and returns to `Idle`.
    pub fn reset(&mut self) {
        self.sender = None;
        self.transmission = None;
        self.receiver = None;
        self.result = None;
        self.advance(Stage::Idle);
    }

    /// Flips eavesdropper presence, resetting the session first. Returns the new flag.
    pub fn toggle_eavesdropper(&mut self) -> bool {
        self.reset();
        self.config.eavesdropper_present = !self.config.eavesdropper_present;
        debug!(
            eavesdropper = self.config.eavesdropper_present,
            "eavesdropper toggled"
        );
        self.config.eavesdropper_present
    }

    /// Changes the run length, resetting the session first.
    pub fn set_length(&mut self, length: usize) -> Result<(), SessionError> {
        if length == 0 {
            return Err(ProtocolError::InvalidLength(length).into());
        }
        self.reset();
        self.config.length = length;
        Ok(())
    }
}
