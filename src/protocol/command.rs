//! Wire command codes.
//!
//! | Request | Reply        | Meaning                         |
//! |---------|--------------|---------------------------------|
//! | 22      | 23 / 24      | start session (online/offline)  |
//! | 10      | 11 / 12      | card id report (known/unknown)  |
//! | 00      | 1 / 2 / 3    | PIN check (ok/wrong/locked out) |
//! | 50      | 51           | current price                   |
//! | 61      | 62           | last consumed energy            |
//! | 63      | 64           | last total                      |
//! | 66      | 67           | account balance                 |
//! | 86, 87  | —            | report energy, cost             |
//! | 09      | —            | repeat last packet              |
//! | 99      | —            | end of session                  |

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    CheckPin = 0,
    PinAccepted = 1,
    PinRejected = 2,
    PinLockedOut = 3,
    RepeatLast = 9,
    CardId = 10,
    CardAuthorized = 11,
    CardUnknown = 12,
    StartSession = 22,
    SessionOnline = 23,
    SessionOffline = 24,
    PriceRequest = 50,
    PriceReply = 51,
    PastEnergyRequest = 61,
    PastEnergyReply = 62,
    PastTotalRequest = 63,
    PastTotalReply = 64,
    BalanceRequest = 66,
    BalanceReply = 67,
    ReportEnergy = 86,
    ReportCost = 87,
    EndSession = 99,
}

impl Command {
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::CheckPin,
            1 => Self::PinAccepted,
            2 => Self::PinRejected,
            3 => Self::PinLockedOut,
            9 => Self::RepeatLast,
            10 => Self::CardId,
            11 => Self::CardAuthorized,
            12 => Self::CardUnknown,
            22 => Self::StartSession,
            23 => Self::SessionOnline,
            24 => Self::SessionOffline,
            50 => Self::PriceRequest,
            51 => Self::PriceReply,
            61 => Self::PastEnergyRequest,
            62 => Self::PastEnergyReply,
            63 => Self::PastTotalRequest,
            64 => Self::PastTotalReply,
            66 => Self::BalanceRequest,
            67 => Self::BalanceReply,
            86 => Self::ReportEnergy,
            87 => Self::ReportCost,
            99 => Self::EndSession,
            _ => return None,
        })
    }

    /// Fixed payload text the station sends with this request, if any.
    pub const fn request_text(self) -> &'static [u8] {
        match self {
            Self::StartSession => b"StartSession",
            Self::RepeatLast => b"RepeatLastPacket",
            Self::EndSession => b"EndofSession",
            Self::PriceRequest => b"SendCurrentPrice",
            Self::PastEnergyRequest => b"SendLastConsumedEnergy",
            Self::PastTotalRequest => b"SendLastTotal",
            Self::BalanceRequest => b"SendBalance",
            _ => b"",
        }
    }
}
