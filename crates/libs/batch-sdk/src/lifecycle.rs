use crate::error::SdkError;
use crate::types::BatchConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum RuntimeState {
    #[default]
    New,
    Configured,
    Started,
    OptedOut,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum SdkMethod {
    SetConfig,
    Start,
    OptIn,
    OptOut,
    SaveProfile,
    Track,
    PrintDebugInformation,
    PushSettings,
    GetInstallationId,
    GetPushToken,
    Messaging,
    FetchInbox,
    MarkInboxRead,
}

impl SdkMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SetConfig => "set_config",
            Self::Start => "start",
            Self::OptIn => "opt_in",
            Self::OptOut => "opt_out",
            Self::SaveProfile => "save_profile",
            Self::Track => "track",
            Self::PrintDebugInformation => "print_debug_information",
            Self::PushSettings => "push_settings",
            Self::GetInstallationId => "get_installation_id",
            Self::GetPushToken => "get_push_token",
            Self::Messaging => "messaging",
            Self::FetchInbox => "fetch_inbox",
            Self::MarkInboxRead => "mark_inbox_read",
        }
    }

    fn is_inbox(self) -> bool {
        matches!(self, Self::FetchInbox | Self::MarkInboxRead)
    }
}

/// Runtime state machine of the client.
///
/// `New -> Configured -> Started`, with `OptedOut` reachable from any of
/// them. Opting back in returns to `Configured` when a configuration is
/// still known, `New` otherwise.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Lifecycle {
    state: RuntimeState,
    config: Option<BatchConfig>,
}

impl Lifecycle {
    pub fn state(&self) -> RuntimeState {
        self.state
    }

    pub fn config(&self) -> Option<&BatchConfig> {
        self.config.as_ref()
    }

    pub fn ensure_method_legal(&self, method: SdkMethod) -> Result<(), SdkError> {
        if legal_states_for_method(method).contains(&self.state) {
            return Ok(());
        }
        if method.is_inbox() {
            let reason = match self.state {
                RuntimeState::OptedOut => "inbox is unavailable while the SDK is opted out",
                _ => "inbox requires a started SDK",
            };
            return Err(SdkError::fetch_not_ready(reason)
                .with_detail("state", JsonValue::String(self.state_name().to_owned())));
        }
        if self.state == RuntimeState::OptedOut {
            return Err(SdkError::opted_out(method.as_str()));
        }
        Err(SdkError::invalid_state(method.as_str(), self.state_name()))
    }

    pub fn mark_configured(&mut self, config: BatchConfig) -> Result<(), SdkError> {
        self.ensure_method_legal(SdkMethod::SetConfig)?;
        self.state = RuntimeState::Configured;
        self.config = Some(config);
        Ok(())
    }

    /// Returns `false` when the runtime was already started.
    pub fn mark_started(&mut self) -> Result<bool, SdkError> {
        self.ensure_method_legal(SdkMethod::Start)?;
        if self.state == RuntimeState::Started {
            return Ok(false);
        }
        self.state = RuntimeState::Started;
        Ok(true)
    }

    pub fn mark_opted_out(&mut self) -> Result<(), SdkError> {
        self.ensure_method_legal(SdkMethod::OptOut)?;
        self.state = RuntimeState::OptedOut;
        Ok(())
    }

    pub fn mark_opted_in(&mut self) -> Result<(), SdkError> {
        self.ensure_method_legal(SdkMethod::OptIn)?;
        self.state = if self.config.is_some() {
            RuntimeState::Configured
        } else {
            RuntimeState::New
        };
        Ok(())
    }

    /// Undo a `mark_started` whose native call failed.
    pub fn rollback_start(&mut self) {
        if self.state == RuntimeState::Started {
            self.state = RuntimeState::Configured;
        }
    }

    pub fn state_name(&self) -> &'static str {
        match self.state {
            RuntimeState::New => "new",
            RuntimeState::Configured => "configured",
            RuntimeState::Started => "started",
            RuntimeState::OptedOut => "opted_out",
        }
    }
}

fn legal_states_for_method(method: SdkMethod) -> &'static [RuntimeState] {
    use RuntimeState as S;
    match method {
        SdkMethod::SetConfig => &[S::New, S::Configured],
        SdkMethod::Start => &[S::Configured, S::Started],
        SdkMethod::OptIn => &[S::OptedOut],
        SdkMethod::OptOut => &[S::New, S::Configured, S::Started],
        SdkMethod::SaveProfile
        | SdkMethod::Track
        | SdkMethod::PrintDebugInformation
        | SdkMethod::PushSettings
        | SdkMethod::Messaging => &[S::New, S::Configured, S::Started],
        SdkMethod::GetInstallationId
        | SdkMethod::GetPushToken
        | SdkMethod::FetchInbox
        | SdkMethod::MarkInboxRead => &[S::Started],
    }
}
