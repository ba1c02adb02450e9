//! The payment wizard as a pure state machine.
//!
//! A [`WizardSession`] is advanced by [`WizardSession::apply`], which never
//! mutates the receiver: it either returns the next session or a
//! [`WizardError`] describing why the event was refused, leaving the caller's
//! session untouched. Nothing here sleeps or talks to a gateway; the
//! asynchronous phases of the confirmation step are entered and left through
//! explicit events (`InitiatePayment` / `GatewayAccepted`, `VerifyOtp` /
//! `VerificationSucceeded`) so the driver decides what happens in between.
//!
//! Forward path by payment method:
//!
//! * UPI: teacher → details → method → UPI → confirmation
//! * card: teacher → details → method → card → recipient → confirmation
//! * net banking: teacher → details → method → recipient → confirmation

use super::instrument::{
    BankAccount, InstrumentError, NewCard, NewRecipient, NewUpi, RecipientAccount, UpiAccount,
    scanned_upi_account,
};
use super::payment::{Amount, PaymentDraft, PaymentRecord, PaymentStatus, PaymentType};
use super::seed;
use super::teacher::Teacher;
use crate::error::StaffPayError;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of the one-time password accepted at confirmation.
pub const OTP_LENGTH: usize = 6;

const BONUS_QUICK_AMOUNT: Decimal = dec!(1000);

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Upi,
    Card,
    #[serde(rename = "netbanking")]
    NetBanking,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upi => write!(f, "upi"),
            Self::Card => write!(f, "card"),
            Self::NetBanking => write!(f, "netbanking"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = StaffPayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upi" => Ok(Self::Upi),
            "card" => Ok(Self::Card),
            "netbanking" => Ok(Self::NetBanking),
            other => Err(StaffPayError::ValidationError(format!(
                "Unknown payment method '{other}'"
            ))),
        }
    }
}

/// Preset amounts offered on the details step.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum QuickAmount {
    FullSalary,
    HalfSalary,
    Bonus,
}

/// Sub-states of the confirmation step.
#[derive(Debug, PartialEq, Clone)]
pub enum ConfirmationPhase {
    Review,
    Initiating,
    AwaitingOtp,
    Verifying,
    Completed(Box<TransactionRecord>),
}

#[derive(Debug, PartialEq, Clone)]
pub enum WizardStep {
    TeacherSelection,
    PaymentDetails,
    MethodSelection,
    UpiDetails,
    CardDetails,
    RecipientSelection,
    Confirmation(ConfirmationPhase),
}

impl WizardStep {
    /// The screen number, 0 through 6.
    pub fn index(&self) -> u8 {
        match self {
            Self::TeacherSelection => 0,
            Self::PaymentDetails => 1,
            Self::MethodSelection => 2,
            Self::UpiDetails => 3,
            Self::CardDetails => 4,
            Self::RecipientSelection => 5,
            Self::Confirmation(_) => 6,
        }
    }

    fn from_index(index: u8) -> Self {
        match index {
            0 => Self::TeacherSelection,
            1 => Self::PaymentDetails,
            2 => Self::MethodSelection,
            3 => Self::UpiDetails,
            4 => Self::CardDetails,
            5 => Self::RecipientSelection,
            _ => Self::Confirmation(ConfirmationPhase::Review),
        }
    }

    /// Whether this screen is part of the forward path for `method`.
    fn applies_to(&self, method: Option<PaymentMethod>) -> bool {
        match self {
            Self::UpiDetails => method == Some(PaymentMethod::Upi),
            Self::CardDetails => method == Some(PaymentMethod::Card),
            Self::RecipientSelection => matches!(
                method,
                Some(PaymentMethod::Card | PaymentMethod::NetBanking)
            ),
            _ => true,
        }
    }
}

#[derive(Debug)]
pub enum WizardEvent {
    SelectTeacher(String),
    ConfirmTeacher,
    SetPaymentType(PaymentType),
    SetAmount(Decimal),
    SetDescription(String),
    ApplyQuickAmount(QuickAmount),
    SubmitDetails,
    SelectMethod(PaymentMethod),
    ConfirmMethod,
    SelectUpi(String),
    AddUpi(NewUpi),
    ScanQr,
    ConfirmUpi,
    SelectCard(String),
    AddCard(NewCard),
    ConfirmCard,
    SelectRecipient(String),
    AddRecipient(NewRecipient),
    ConfirmRecipient,
    InitiatePayment,
    GatewayAccepted,
    GatewayRejected,
    EnterOtp(String),
    VerifyOtp,
    VerificationSucceeded { at: DateTime<Utc> },
    VerificationFailed,
    Back,
}

impl WizardEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::SelectTeacher(_) => "select teacher",
            Self::ConfirmTeacher => "confirm teacher",
            Self::SetPaymentType(_) => "set payment type",
            Self::SetAmount(_) => "set amount",
            Self::SetDescription(_) => "set description",
            Self::ApplyQuickAmount(_) => "quick amount",
            Self::SubmitDetails => "submit details",
            Self::SelectMethod(_) => "select method",
            Self::ConfirmMethod => "confirm method",
            Self::SelectUpi(_) => "select UPI account",
            Self::AddUpi(_) => "add UPI account",
            Self::ScanQr => "scan QR code",
            Self::ConfirmUpi => "confirm UPI account",
            Self::SelectCard(_) => "select card",
            Self::AddCard(_) => "add card",
            Self::ConfirmCard => "confirm card",
            Self::SelectRecipient(_) => "select recipient",
            Self::AddRecipient(_) => "add recipient",
            Self::ConfirmRecipient => "confirm recipient",
            Self::InitiatePayment => "initiate payment",
            Self::GatewayAccepted => "gateway accepted",
            Self::GatewayRejected => "gateway rejected",
            Self::EnterOtp(_) => "enter OTP",
            Self::VerifyOtp => "verify OTP",
            Self::VerificationSucceeded { .. } => "verification succeeded",
            Self::VerificationFailed => "verification failed",
            Self::Back => "back",
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WizardError {
    #[error("Please select a teacher")]
    TeacherRequired,
    #[error("Teacher '{0}' is not available for payment")]
    UnknownTeacher(String),
    #[error("Please enter a valid payment amount")]
    InvalidAmount,
    #[error("Please select a payment method")]
    MethodRequired,
    #[error("Please select a UPI account or add a new one")]
    UpiRequired,
    #[error("Please select a bank")]
    CardRequired,
    #[error("Please select a recipient")]
    RecipientRequired,
    #[error("Unknown {kind} '{id}'")]
    UnknownInstrument { kind: &'static str, id: String },
    #[error(transparent)]
    Instrument(#[from] InstrumentError),
    #[error("Please enter a valid 6-digit OTP")]
    InvalidOtp,
    #[error("A payment step is already in progress")]
    Busy,
    #[error("The payment has already been completed")]
    Finished,
    #[error("'{event}' is not available on step {step}")]
    UnexpectedEvent { event: &'static str, step: u8 },
}

impl From<WizardError> for StaffPayError {
    fn from(err: WizardError) -> Self {
        StaffPayError::ValidationError(err.to_string())
    }
}

/// What the wizard hands to the payment ledger when it finishes.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub teacher: Teacher,
    pub payment_data: PaymentDraft,
    pub method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_bank: Option<BankAccount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_recipient: Option<RecipientAccount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_upi: Option<UpiAccount>,
    pub otp: String,
    pub timestamp: DateTime<Utc>,
    pub transaction_id: String,
}

impl TransactionRecord {
    pub fn to_payment_record(&self, id: String) -> PaymentRecord {
        PaymentRecord {
            id,
            teacher_id: self.teacher.id.clone(),
            teacher_name: self.teacher.name.clone(),
            amount: self.payment_data.amount,
            r#type: self.payment_data.r#type,
            description: self.payment_data.description.clone(),
            date: self.timestamp,
            status: PaymentStatus::Completed,
            transaction_id: Some(self.transaction_id.clone()),
        }
    }
}

/// Builds the `TXN<epoch millis>` identifier.
pub fn transaction_id(at: DateTime<Utc>) -> String {
    format!("TXN{}", at.timestamp_millis())
}

/// The instrument a payment is drawn through, as shown to a gateway.
#[derive(Debug, PartialEq, Clone)]
pub enum Instrument {
    Upi(UpiAccount),
    Card {
        card: BankAccount,
        recipient: RecipientAccount,
    },
    NetBanking {
        recipient: RecipientAccount,
    },
}

/// Everything a gateway needs to process the payment.
#[derive(Debug, PartialEq, Clone)]
pub struct PaymentIntent {
    pub teacher_id: String,
    pub teacher_name: String,
    pub amount: Amount,
    pub r#type: PaymentType,
    pub instrument: Instrument,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WizardSession {
    step: WizardStep,
    candidates: Vec<Teacher>,
    teacher: Option<Teacher>,
    draft: PaymentDraft,
    method: Option<PaymentMethod>,
    cards: Vec<BankAccount>,
    selected_card: Option<String>,
    recipients: Vec<RecipientAccount>,
    selected_recipient: Option<String>,
    upi_accounts: Vec<UpiAccount>,
    selected_upi: Option<String>,
    otp: String,
}

impl WizardSession {
    /// Opens the wizard over the given roster, keeping active teachers only,
    /// with the built-in instruments available.
    pub fn open(teachers: &[Teacher]) -> Self {
        Self::with_instruments(
            teachers,
            seed::bank_accounts(),
            seed::recipients(),
            seed::upi_accounts(),
        )
    }

    pub fn with_instruments(
        teachers: &[Teacher],
        cards: Vec<BankAccount>,
        recipients: Vec<RecipientAccount>,
        upi_accounts: Vec<UpiAccount>,
    ) -> Self {
        Self {
            step: WizardStep::TeacherSelection,
            candidates: teachers.iter().filter(|t| t.is_active()).cloned().collect(),
            teacher: None,
            draft: PaymentDraft::default(),
            method: None,
            cards,
            selected_card: None,
            recipients,
            selected_recipient: None,
            upi_accounts,
            selected_upi: None,
            otp: String::new(),
        }
    }

    pub fn step(&self) -> &WizardStep {
        &self.step
    }

    pub fn current_step(&self) -> u8 {
        self.step.index()
    }

    pub fn teacher(&self) -> Option<&Teacher> {
        self.teacher.as_ref()
    }

    pub fn draft(&self) -> &PaymentDraft {
        &self.draft
    }

    pub fn method(&self) -> Option<PaymentMethod> {
        self.method
    }

    pub fn otp(&self) -> &str {
        &self.otp
    }

    pub fn cards(&self) -> &[BankAccount] {
        &self.cards
    }

    pub fn recipients(&self) -> &[RecipientAccount] {
        &self.recipients
    }

    pub fn upi_accounts(&self) -> &[UpiAccount] {
        &self.upi_accounts
    }

    pub fn selected_card(&self) -> Option<&BankAccount> {
        find(&self.cards, self.selected_card.as_deref(), |c| &c.id)
    }

    pub fn selected_recipient(&self) -> Option<&RecipientAccount> {
        find(&self.recipients, self.selected_recipient.as_deref(), |r| &r.id)
    }

    pub fn selected_upi(&self) -> Option<&UpiAccount> {
        find(&self.upi_accounts, self.selected_upi.as_deref(), |u| &u.id)
    }

    /// Active teachers whose name, subject, email or role contain `term`.
    pub fn matching_teachers(&self, term: &str) -> Vec<&Teacher> {
        self.candidates.iter().filter(|t| t.matches(term)).collect()
    }

    pub fn is_processing(&self) -> bool {
        matches!(
            self.step,
            WizardStep::Confirmation(ConfirmationPhase::Initiating | ConfirmationPhase::Verifying)
        )
    }

    pub fn otp_visible(&self) -> bool {
        matches!(
            self.step,
            WizardStep::Confirmation(
                ConfirmationPhase::AwaitingOtp
                    | ConfirmationPhase::Verifying
                    | ConfirmationPhase::Completed(_)
            )
        )
    }

    /// The emitted record, once verification has succeeded.
    pub fn record(&self) -> Option<&TransactionRecord> {
        match &self.step {
            WizardStep::Confirmation(ConfirmationPhase::Completed(record)) => Some(record),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.record().is_some()
    }

    /// The payment as the gateway sees it. Only meaningful on the confirmation step.
    pub fn intent(&self) -> Option<PaymentIntent> {
        let teacher = self.teacher.as_ref()?;
        let amount = Amount::new(self.draft.amount).ok()?;
        let instrument = match self.method? {
            PaymentMethod::Upi => Instrument::Upi(self.selected_upi()?.clone()),
            PaymentMethod::Card => Instrument::Card {
                card: self.selected_card()?.clone(),
                recipient: self.selected_recipient()?.clone(),
            },
            PaymentMethod::NetBanking => Instrument::NetBanking {
                recipient: self.selected_recipient()?.clone(),
            },
        };
        Some(PaymentIntent {
            teacher_id: teacher.id.clone(),
            teacher_name: teacher.name.clone(),
            amount,
            r#type: self.draft.r#type,
            instrument,
        })
    }

    /// Computes the session that results from `event`.
    pub fn apply(&self, event: WizardEvent) -> Result<Self, WizardError> {
        let mut next = self.clone();
        next.handle(event)?;
        Ok(next)
    }

    fn handle(&mut self, event: WizardEvent) -> Result<(), WizardError> {
        use ConfirmationPhase as Phase;
        use WizardEvent as E;
        use WizardStep as S;

        if let E::Back = event {
            return self.back();
        }

        match (&self.step, event) {
            (S::TeacherSelection, E::SelectTeacher(id)) => {
                let teacher = self
                    .candidates
                    .iter()
                    .find(|t| t.id == id)
                    .ok_or(WizardError::UnknownTeacher(id))?;
                self.teacher = Some(teacher.clone());
            }
            (S::TeacherSelection, E::ConfirmTeacher) => {
                let teacher = self.teacher.as_ref().ok_or(WizardError::TeacherRequired)?;
                self.draft.amount = teacher.salary;
                self.step = S::PaymentDetails;
            }

            (S::PaymentDetails, E::SetPaymentType(kind)) => self.draft.r#type = kind,
            (S::PaymentDetails, E::SetAmount(amount)) => self.draft.amount = amount,
            (S::PaymentDetails, E::SetDescription(text)) => self.draft.description = text,
            (S::PaymentDetails, E::ApplyQuickAmount(quick)) => {
                let salary = self
                    .teacher
                    .as_ref()
                    .map_or(Decimal::ZERO, |teacher| teacher.salary);
                self.draft.amount = match quick {
                    QuickAmount::FullSalary => salary,
                    QuickAmount::HalfSalary => (salary / dec!(2))
                        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
                    QuickAmount::Bonus => BONUS_QUICK_AMOUNT,
                };
            }
            (S::PaymentDetails, E::SubmitDetails) => {
                Amount::new(self.draft.amount).map_err(|_| WizardError::InvalidAmount)?;
                self.step = S::MethodSelection;
            }

            (S::MethodSelection, E::SelectMethod(method)) => self.method = Some(method),
            (S::MethodSelection, E::ConfirmMethod) => {
                self.step = match self.method.ok_or(WizardError::MethodRequired)? {
                    PaymentMethod::Upi => S::UpiDetails,
                    PaymentMethod::Card => S::CardDetails,
                    PaymentMethod::NetBanking => S::RecipientSelection,
                };
            }

            (S::UpiDetails, E::SelectUpi(id)) => {
                ensure_known(&self.upi_accounts, &id, |u| &u.id, "UPI account")?;
                self.selected_upi = Some(id);
            }
            (S::UpiDetails, E::AddUpi(form)) => {
                let account = form.into_account(next_id(&self.upi_accounts, |u| &u.id))?;
                self.selected_upi = Some(account.id.clone());
                self.upi_accounts.push(account);
            }
            (S::UpiDetails, E::ScanQr) => {
                let account = scanned_upi_account(next_id(&self.upi_accounts, |u| &u.id));
                self.selected_upi = Some(account.id.clone());
                self.upi_accounts.push(account);
            }
            (S::UpiDetails, E::ConfirmUpi) => {
                self.selected_upi().ok_or(WizardError::UpiRequired)?;
                // UPI pays the teacher's handle directly, no recipient step
                self.step = S::Confirmation(Phase::Review);
            }

            (S::CardDetails, E::SelectCard(id)) => {
                ensure_known(&self.cards, &id, |c| &c.id, "card")?;
                self.selected_card = Some(id);
            }
            (S::CardDetails, E::AddCard(form)) => {
                let card = form.into_account(next_id(&self.cards, |c| &c.id))?;
                self.selected_card = Some(card.id.clone());
                self.cards.push(card);
            }
            (S::CardDetails, E::ConfirmCard) => {
                self.selected_card().ok_or(WizardError::CardRequired)?;
                self.step = S::RecipientSelection;
            }

            (S::RecipientSelection, E::SelectRecipient(id)) => {
                ensure_known(&self.recipients, &id, |r| &r.id, "recipient")?;
                self.selected_recipient = Some(id);
            }
            (S::RecipientSelection, E::AddRecipient(form)) => {
                let recipient = form.into_account(next_id(&self.recipients, |r| &r.id))?;
                self.selected_recipient = Some(recipient.id.clone());
                self.recipients.push(recipient);
            }
            (S::RecipientSelection, E::ConfirmRecipient) => {
                self.selected_recipient().ok_or(WizardError::RecipientRequired)?;
                self.step = S::Confirmation(Phase::Review);
            }

            (S::Confirmation(Phase::Review), E::InitiatePayment) => {
                self.step = S::Confirmation(Phase::Initiating);
            }
            (S::Confirmation(Phase::Initiating), E::GatewayAccepted) => {
                self.step = S::Confirmation(Phase::AwaitingOtp);
            }
            (S::Confirmation(Phase::Initiating), E::GatewayRejected) => {
                self.step = S::Confirmation(Phase::Review);
            }
            (S::Confirmation(Phase::AwaitingOtp), E::EnterOtp(otp)) => self.otp = otp,
            (S::Confirmation(Phase::AwaitingOtp), E::VerifyOtp) => {
                if !is_valid_otp(&self.otp) {
                    return Err(WizardError::InvalidOtp);
                }
                self.step = S::Confirmation(Phase::Verifying);
            }
            (S::Confirmation(Phase::Verifying), E::VerificationSucceeded { at }) => {
                let record = self.build_record(at)?;
                self.step = S::Confirmation(Phase::Completed(Box::new(record)));
            }
            (S::Confirmation(Phase::Verifying), E::VerificationFailed) => {
                self.step = S::Confirmation(Phase::AwaitingOtp);
            }
            (S::Confirmation(Phase::Initiating | Phase::Verifying), _) => {
                return Err(WizardError::Busy);
            }
            (S::Confirmation(Phase::Completed(_)), _) => return Err(WizardError::Finished),

            (step, event) => {
                return Err(WizardError::UnexpectedEvent {
                    event: event.name(),
                    step: step.index(),
                });
            }
        }
        Ok(())
    }

    /// Steps back one screen without re-validating anything. Screens that are
    /// not on the chosen method's path are passed over.
    fn back(&mut self) -> Result<(), WizardError> {
        match &self.step {
            WizardStep::Confirmation(
                ConfirmationPhase::Initiating | ConfirmationPhase::Verifying,
            ) => {
                return Err(WizardError::Busy);
            }
            WizardStep::Confirmation(ConfirmationPhase::Completed(_)) => {
                return Err(WizardError::Finished);
            }
            WizardStep::TeacherSelection => return Ok(()),
            _ => {}
        }
        let mut index = self.step.index();
        loop {
            index -= 1;
            let candidate = WizardStep::from_index(index);
            if candidate.applies_to(self.method) {
                self.step = candidate;
                return Ok(());
            }
        }
    }

    fn build_record(&self, at: DateTime<Utc>) -> Result<TransactionRecord, WizardError> {
        let teacher = self.teacher.clone().ok_or(WizardError::TeacherRequired)?;
        let method = self.method.ok_or(WizardError::MethodRequired)?;
        let (selected_bank, selected_recipient, selected_upi) = match method {
            PaymentMethod::Upi => (None, None, self.selected_upi().cloned()),
            PaymentMethod::Card => (
                self.selected_card().cloned(),
                self.selected_recipient().cloned(),
                None,
            ),
            PaymentMethod::NetBanking => (None, self.selected_recipient().cloned(), None),
        };
        Ok(TransactionRecord {
            teacher,
            payment_data: PaymentDraft {
                status: PaymentStatus::Completed,
                ..self.draft.clone()
            },
            method,
            selected_bank,
            selected_recipient,
            selected_upi,
            otp: self.otp.clone(),
            timestamp: at,
            transaction_id: transaction_id(at),
        })
    }
}

/// An OTP is exactly six ASCII digits.
pub fn is_valid_otp(otp: &str) -> bool {
    otp.len() == OTP_LENGTH && otp.bytes().all(|b| b.is_ascii_digit())
}

fn find<'a, T>(items: &'a [T], id: Option<&str>, key: impl Fn(&T) -> &String) -> Option<&'a T> {
    let id = id?;
    items.iter().find(|item| key(item) == id)
}

fn ensure_known<T>(
    items: &[T],
    id: &str,
    key: impl Fn(&T) -> &String,
    kind: &'static str,
) -> Result<(), WizardError> {
    if items.iter().any(|item| key(item) == id) {
        Ok(())
    } else {
        Err(WizardError::UnknownInstrument {
            kind,
            id: id.to_string(),
        })
    }
}

/// Instruments are numbered from one, continuing after the highest numeric id.
fn next_id<T>(items: &[T], key: impl Fn(&T) -> &String) -> String {
    let highest = items
        .iter()
        .filter_map(|item| key(item).parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    (highest + 1).to_string()
}
