use crate::commands::{
    Command, FEATURE_VALUE_OFFSET, INFO_OFFSET, OUTPUT_MODE_OFFSET, PROFILE_MASK_OFFSET,
};
use crate::drain::{drain, read_one};
use crate::error::CommandError;
use crate::features::{self, Feature};
use crate::frame::{self, Response};
use crate::session::Session;
use crate::transport::Transport;
use crate::value::{decode_float, decode_toggle, encode_toggle};
use blasterx_types::{
    DspFeature, GlobalProfileFlag, OutputMode, Requirement, ValueKind, FAMILY_DSP,
};
use enumset::EnumSet;
use log::{debug, error, warn};
use std::time::Duration;

const MAX_BACKLOG_DRAINS: usize = 16;

/// A DSP value as the device stores it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FeatureValue(pub f32);

impl FeatureValue {
    pub fn from_bool(enabled: bool) -> Self {
        Self(encode_toggle(enabled))
    }

    pub fn as_bool(&self) -> bool {
        decode_toggle(self.0)
    }
}

/// A decoded answer, along with the frame it was taken from.
#[derive(Clone, Debug)]
pub struct Reading<T> {
    pub value: T,
    pub response: Response,
}

impl<T> Reading<T> {
    pub fn echoes(&self, command: &Command) -> bool {
        self.response.echoes(&command.bytes())
    }
}

/// Each field is `None` when that particular query went unanswered.
#[derive(Clone, Debug, Default)]
pub struct DeviceInfo {
    pub identify: Option<u8>,
    pub serial: Option<Vec<u8>>,
    pub hardware_id: Option<u8>,
    pub dsp_version: Option<Vec<u8>>,
    pub firmware: Option<String>,
}

pub struct ProtocolClient<'a, T: Transport> {
    session: &'a mut Session<T>,
}

impl<'a, T: Transport> ProtocolClient<'a, T> {
    pub fn new(session: &'a mut Session<T>) -> Self {
        Self { session }
    }

    fn send(&mut self, command: &[u8]) -> Result<(), CommandError> {
        let frame = frame::encode(command)?;
        self.settle()?;
        let config = self.session.config().clone();

        debug!("Sending {:02x?}", command);
        if let Err(err) = self.session.transport_mut().write_control(
            config.request_type,
            config.request,
            config.value,
            u16::from(config.interface),
            frame.as_bytes(),
        ) {
            error!("Error when attempting to write control: {}", err);
            return Err(CommandError::TransportFault(err));
        }
        Ok(())
    }

    /// Reads off whatever a capped drain left behind, so it isn't taken as
    /// the reply to the next command.
    fn settle(&mut self) -> Result<(), CommandError> {
        let timeout = self.session.config().drain_timeout;
        let mut rounds = 0;
        while self.session.has_backlog() {
            if rounds == MAX_BACKLOG_DRAINS {
                warn!("Device still busy after {} drains, sending anyway", rounds);
                break;
            }
            let stale = drain(self.session, timeout)?;
            debug!("Discarded {} frames left from the last command", stale.len());
            rounds += 1;
        }
        Ok(())
    }

    /// Request / reply: one write, then exactly one bounded read.
    pub fn query(&mut self, command: &[u8]) -> Result<Option<Response>, CommandError> {
        self.send(command)?;
        let timeout = self.session.config().reply_timeout;
        read_one(self.session, timeout)
    }

    /// Fire and forget: one write, then read until the device goes quiet. The
    /// frames are handed back in arrival order.
    pub fn command_and_flush(
        &mut self,
        command: &[u8],
        drain_timeout: Duration,
    ) -> Result<Vec<Response>, CommandError> {
        self.send(command)?;
        let responses = drain(self.session, drain_timeout)?;

        for response in &responses {
            match response.acked_opcode() {
                Some(opcode) => debug!("ACK received for {:#04x}", opcode),
                None => debug!("Flushed {:02x?}", &response.as_bytes()[..12]),
            }
        }
        if !responses.iter().any(|r| r.is_ack()) {
            debug!("No ACK seen for {:02x?}", command);
        }
        Ok(responses)
    }

    fn ask(&mut self, command: Command) -> Result<Option<Response>, CommandError> {
        let response = self.query(&command.bytes())?;
        match &response {
            Some(response) if !response.echoes(&command.bytes()) => warn!(
                "Reply to {:?} carries opcode {:#04x}: {:02x?}",
                command,
                response.opcode(),
                &response.as_bytes()[..12]
            ),
            Some(_) => {}
            None => debug!("No reply to {:?}", command),
        }
        Ok(response)
    }

    fn run(&mut self, command: Command) -> Result<Vec<Response>, CommandError> {
        let timeout = self.session.config().drain_timeout;
        self.command_and_flush(&command.bytes(), timeout)
    }

    pub fn read_feature(
        &mut self,
        family: u8,
        id: u8,
    ) -> Result<Option<Reading<FeatureValue>>, CommandError> {
        if features::lookup(family, id).is_none() {
            return Err(CommandError::FeatureNotFound { family, id });
        }
        self.read_raw(family, id)
    }

    /// Reads any id in `family`, whether the registry knows it or not.
    pub fn read_raw(
        &mut self,
        family: u8,
        id: u8,
    ) -> Result<Option<Reading<FeatureValue>>, CommandError> {
        let Some(response) = self.ask(Command::ReadFeature { family, id })? else {
            return Ok(None);
        };

        let value = decode_float(response.as_bytes(), FEATURE_VALUE_OFFSET)?;
        match features::lookup(family, id) {
            Some(feature) => debug!("Read {} = {}", feature.name, value),
            None => debug!("Read {:#04x}:{:#04x} = {}", family, id, value),
        }
        Ok(Some(Reading {
            value: FeatureValue(value),
            response,
        }))
    }

    /// The registry is informational here, ids it doesn't know are still sent.
    pub fn write_feature(
        &mut self,
        family: u8,
        id: u8,
        value: FeatureValue,
    ) -> Result<Vec<Response>, CommandError> {
        match features::lookup(family, id) {
            Some(feature) => debug!("Writing {} = {}", feature.name, value.0),
            None => warn!(
                "Writing unregistered feature {:#04x}:{:#04x} = {}",
                family, id, value.0
            ),
        }
        self.run(Command::WriteFeature {
            family,
            id,
            value: value.0,
        })
    }

    pub fn get(
        &mut self,
        feature: DspFeature,
    ) -> Result<Option<Reading<FeatureValue>>, CommandError> {
        self.read_feature(feature.family(), feature.id())
    }

    pub fn set(
        &mut self,
        feature: DspFeature,
        value: FeatureValue,
    ) -> Result<Vec<Response>, CommandError> {
        self.write_feature(feature.family(), feature.id(), value)
    }

    /// Writes `feature` after switching on whatever it depends on. An
    /// unanswered check counts as "off", so the requirement is written anyway.
    pub fn set_feature(
        &mut self,
        feature: DspFeature,
        value: FeatureValue,
    ) -> Result<Vec<Response>, CommandError> {
        for requirement in feature.requirements() {
            match requirement {
                Requirement::Profile(flag) => {
                    let enabled = self
                        .read_global_profile()?
                        .map(|reading| reading.value.contains(flag));
                    if enabled != Some(true) {
                        debug!("Enabling {} for {}", flag, feature);
                        self.set_global_profile(flag, true)?;
                    }
                }
                Requirement::Toggle(toggle) => {
                    let enabled = self.get(toggle)?.map(|reading| reading.value.as_bool());
                    if enabled != Some(true) {
                        debug!("Enabling {} for {}", toggle, feature);
                        self.set(toggle, FeatureValue::from_bool(true))?;
                    }
                }
            }
        }
        self.set(feature, value)
    }

    /// Flips a toggle, returning the value written. Nothing is written if the
    /// current state couldn't be read. Levels are refused with `NotAToggle`.
    pub fn toggle_feature(
        &mut self,
        feature: DspFeature,
    ) -> Result<Option<FeatureValue>, CommandError> {
        if feature.value_kind() != ValueKind::Toggle {
            return Err(CommandError::NotAToggle(feature));
        }
        let Some(current) = self.get(feature)? else {
            return Ok(None);
        };
        let value = FeatureValue::from_bool(!current.value.as_bool());
        self.set_feature(feature, value)?;
        Ok(Some(value))
    }

    pub fn read_all(
        &mut self,
        family: u8,
    ) -> Result<Vec<(Feature, Option<FeatureValue>)>, CommandError> {
        let mut values = vec![];
        for feature in features::list(family) {
            let value = self.read_feature(family, feature.id)?;
            values.push((feature, value.map(|reading| reading.value)));
        }
        Ok(values)
    }

    /// Zeroes every registered feature of the family.
    pub fn reset_features(&mut self, family: u8) -> Result<(), CommandError> {
        for feature in features::list(family) {
            self.write_feature(family, feature.id, FeatureValue(0.0))?;
        }
        Ok(())
    }

    /// Switches off every writable profile flag, then zeroes the DSP family.
    /// The output selection is left alone.
    pub fn reset(&mut self) -> Result<(), CommandError> {
        for flag in EnumSet::<GlobalProfileFlag>::all() {
            if flag.group_id().is_some() {
                self.set_global_profile(flag, false)?;
            }
        }
        self.reset_features(FAMILY_DSP)
    }

    pub fn read_global_profile(
        &mut self,
    ) -> Result<Option<Reading<EnumSet<GlobalProfileFlag>>>, CommandError> {
        let Some(response) = self.ask(Command::ReadGlobalProfile)? else {
            return Ok(None);
        };

        let mask = response.as_bytes()[PROFILE_MASK_OFFSET];
        let value = EnumSet::<GlobalProfileFlag>::from_u8_truncated(mask);
        debug!("Global profile mask {:#04x} = {:?}", mask, value);
        Ok(Some(Reading { value, response }))
    }

    pub fn set_global_profile(
        &mut self,
        flag: GlobalProfileFlag,
        enabled: bool,
    ) -> Result<Vec<Response>, CommandError> {
        let group = flag.group_id().ok_or(CommandError::ReadOnlyFlag(flag))?;
        debug!("Writing {} = {}", flag, enabled);
        self.run(Command::SetGlobalProfile { group, enabled })
    }

    pub fn read_output(&mut self) -> Result<Option<Reading<Option<OutputMode>>>, CommandError> {
        let Some(response) = self.ask(Command::ReadOutput)? else {
            return Ok(None);
        };

        let mode = response.as_bytes()[OUTPUT_MODE_OFFSET];
        let value = OutputMode::from_mode(mode);
        match value {
            Some(output) => debug!("Current output: {}", output),
            None => error!("Unknown output mode: {:#04x}", mode),
        }
        Ok(Some(Reading { value, response }))
    }

    pub fn set_output(&mut self, output: OutputMode) -> Result<Vec<Response>, CommandError> {
        debug!("Setting output: {}", output);
        self.run(Command::SetOutput(output))
    }

    pub fn identify(&mut self) -> Result<Option<Reading<u8>>, CommandError> {
        Ok(self.ask(Command::Identify)?.map(|response| Reading {
            value: response.as_bytes()[INFO_OFFSET],
            response,
        }))
    }

    pub fn ping(&mut self) -> Result<Option<Response>, CommandError> {
        self.ask(Command::Ping)
    }

    pub fn serial(&mut self) -> Result<Option<Reading<Vec<u8>>>, CommandError> {
        Ok(self.ask(Command::GetSerial)?.map(|response| Reading {
            value: response.length_prefixed(INFO_OFFSET).to_vec(),
            response,
        }))
    }

    pub fn hardware_id(&mut self) -> Result<Option<Reading<u8>>, CommandError> {
        Ok(self.ask(Command::GetHardwareId)?.map(|response| Reading {
            value: response.as_bytes()[INFO_OFFSET],
            response,
        }))
    }

    pub fn dsp_version(&mut self) -> Result<Option<Reading<Vec<u8>>>, CommandError> {
        Ok(self.ask(Command::GetDspVersion)?.map(|response| Reading {
            value: response.length_prefixed(INFO_OFFSET).to_vec(),
            response,
        }))
    }

    pub fn firmware_string(&mut self) -> Result<Option<Reading<String>>, CommandError> {
        Ok(self.ask(Command::GetFirmwareString)?.map(|response| Reading {
            value: String::from_utf8_lossy(response.length_prefixed(INFO_OFFSET)).into_owned(),
            response,
        }))
    }

    pub fn device_info(&mut self) -> Result<DeviceInfo, CommandError> {
        Ok(DeviceInfo {
            identify: self.identify()?.map(|reading| reading.value),
            serial: self.serial()?.map(|reading| reading.value),
            hardware_id: self.hardware_id()?.map(|reading| reading.value),
            dsp_version: self.dsp_version()?.map(|reading| reading.value),
            firmware: self.firmware_string()?.map(|reading| reading.value),
        })
    }
}
