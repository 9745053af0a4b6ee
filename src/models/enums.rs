//! Closed value sets accepted by the API.
//!
//! Each enum parses case-insensitively from the command line (via clap's
//! `ValueEnum`) and knows the exact string the API expects on the wire.

use clap::ValueEnum;
use std::fmt;

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:tt),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
        pub enum $name {
            $(
                #[value(name = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum!(Currency {
    Sar => "SAR",
    Usd => "USD",
    Eur => "EUR",
    Gbp => "GBP",
    Aed => "AED",
    Bhd => "BHD",
    Kwd => "KWD",
    Omr => "OMR",
    Qar => "QAR",
});

wire_enum!(SortDirection {
    Asc => "asc",
    Desc => "desc",
});

wire_enum!(Language {
    Ar => "AR",
    En => "EN",
});

wire_enum!(CommunicationMethod {
    Whatsapp => "WHATSAPP",
    Email => "EMAIL",
    Sms => "SMS",
});

wire_enum!(ProductType {
    Recurring => "RECURRING",
    OneOff => "ONE_OFF",
});

wire_enum!(RecurringInterval {
    Week => "WEEK",
    Month => "MONTH",
    Semester => "SEMESTER",
    Year => "YEAR",
});

wire_enum!(SubscriptionStatus {
    Inactive => "INACTIVE",
    Active => "ACTIVE",
    Expired => "EXPIRED",
    Canceled => "CANCELED",
    Frozen => "FROZEN",
});

wire_enum!(InvoiceStatus {
    Draft => "DRAFT",
    Created => "CREATED",
    Sent => "SENT",
    Accepted => "ACCEPTED",
    Rejected => "REJECTED",
    Completed => "COMPLETED",
    Canceled => "CANCELED",
    Expired => "EXPIRED",
});

wire_enum!(PaymentStatus {
    Pending => "PENDING",
    Processing => "PROCESSING",
    FailedInitiation => "FAILED_INITIATION",
    Succeeded => "SUCCEEDED",
    Failed => "FAILED",
    Canceled => "CANCELED",
    UnderReview => "UNDER_REVIEW",
    Expired => "EXPIRED",
    Settled => "SETTLED",
    Refunded => "REFUNDED",
});

wire_enum!(
    /// Payment methods that can be recorded by hand.
    ManualPaymentMethod {
        Cash => "CASH",
        BankTransfer => "BANK_TRANSFER",
        Card => "CARD",
        Qurrah => "QURRAH",
    }
);

wire_enum!(RefundReason {
    RequestedByCustomer => "REQUESTED_BY_CUSTOMER",
    Duplicate => "DUPLICATE",
    Fraudulent => "FRAUDULENT",
    Other => "OTHER",
});

wire_enum!(PaymentLinkStatus {
    Active => "ACTIVE",
    Inactive => "INACTIVE",
    Completed => "COMPLETED",
});

wire_enum!(ContactInformationType {
    Phone => "PHONE",
    Email => "EMAIL",
});

/// Convert a parsed list of enum values into their wire strings.
pub fn wire_list<T: Copy + fmt::Display>(values: &[T]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(Currency::from_str("sar", true), Ok(Currency::Sar));
        assert_eq!(
            ManualPaymentMethod::from_str("bank_transfer", true),
            Ok(ManualPaymentMethod::BankTransfer)
        );
        assert!(Currency::from_str("XYZ", true).is_err());
    }

    #[test]
    fn wire_strings_match_api() {
        assert_eq!(PaymentStatus::FailedInitiation.as_str(), "FAILED_INITIATION");
        assert_eq!(SortDirection::Desc.to_string(), "desc");
        assert_eq!(
            wire_list(&[InvoiceStatus::Sent, InvoiceStatus::Draft]),
            vec!["SENT", "DRAFT"]
        );
    }
}
