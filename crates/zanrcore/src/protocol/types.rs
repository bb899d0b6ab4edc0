//! Message type code enumerations

/// Client to server message codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ClientCode {
    BeginConnection = 52,
    Password = 53,
    Command = 54,
    Pong = 55,
    Disconnect = 56,
}

impl ClientCode {
    /// Convert from u8
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            52 => Some(Self::BeginConnection),
            53 => Some(Self::Password),
            54 => Some(Self::Command),
            55 => Some(Self::Pong),
            56 => Some(Self::Disconnect),
            _ => None,
        }
    }

    /// Convert to u8
    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

/// Server to client message codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ServerCode {
    OldProtocol = 32,
    Banned = 33,
    Salt = 34,
    LoggedIn = 35,
    InvalidPassword = 36,
    Message = 37,
    Update = 38,
}

impl ServerCode {
    /// Convert from u8
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            32 => Some(Self::OldProtocol),
            33 => Some(Self::Banned),
            34 => Some(Self::Salt),
            35 => Some(Self::LoggedIn),
            36 => Some(Self::InvalidPassword),
            37 => Some(Self::Message),
            38 => Some(Self::Update),
            _ => None,
        }
    }

    /// Convert to u8
    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

/// Subtypes carried by an update message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UpdateCode {
    PlayerData = 0,
    AdminCount = 1,
    Map = 2,
}

impl UpdateCode {
    /// Convert from u8
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::PlayerData),
            1 => Some(Self::AdminCount),
            2 => Some(Self::Map),
            _ => None,
        }
    }

    /// Convert to u8
    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

impl From<ClientCode> for u8 {
    #[inline]
    fn from(value: ClientCode) -> Self {
        value.to_u8()
    }
}

impl From<ServerCode> for u8 {
    #[inline]
    fn from(value: ServerCode) -> Self {
        value.to_u8()
    }
}

impl From<UpdateCode> for u8 {
    #[inline]
    fn from(value: UpdateCode) -> Self {
        value.to_u8()
    }
}
