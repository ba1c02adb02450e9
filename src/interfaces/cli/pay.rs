//! `staffpay pay`: walks one wizard session from teacher selection to a
//! completed payment, feeding it the events the flags describe.

use super::{Context, print_json, render};
use crate::domain::instrument::{
    CardType, INDIAN_BANKS, NewCard, NewRecipient, NewUpi, UPI_PROVIDERS,
};
use crate::domain::payment::PaymentType;
use crate::domain::wizard::{
    PaymentMethod, QuickAmount, WizardError, WizardEvent, WizardSession,
};
use crate::error::{Result, StaffPayError};
use clap::builder::PossibleValuesParser;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use std::io::Write;
use tracing::{debug, info};

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum QuickArg {
    /// The teacher's full monthly salary.
    Full,
    /// Half the salary, rounded to a whole amount.
    Half,
    /// A fixed bonus of 1000.
    Bonus,
}

impl From<QuickArg> for QuickAmount {
    fn from(arg: QuickArg) -> Self {
        match arg {
            QuickArg::Full => QuickAmount::FullSalary,
            QuickArg::Half => QuickAmount::HalfSalary,
            QuickArg::Bonus => QuickAmount::Bonus,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum CardTypeArg {
    #[default]
    Debit,
    Credit,
}

impl From<CardTypeArg> for CardType {
    fn from(arg: CardTypeArg) -> Self {
        match arg {
            CardTypeArg::Debit => CardType::Debit,
            CardTypeArg::Credit => CardType::Credit,
        }
    }
}

#[derive(Args, Debug)]
pub struct PayArgs {
    /// Id of an active teacher, or a search term matching exactly one.
    #[arg(long)]
    pub teacher: String,

    /// Payment amount; defaults to the teacher's salary.
    #[arg(long, conflicts_with = "quick")]
    pub amount: Option<Decimal>,
    #[arg(long, value_enum)]
    pub quick: Option<QuickArg>,
    #[arg(long = "type", default_value = "salary")]
    pub r#type: PaymentType,
    #[arg(long, default_value = "")]
    pub description: String,

    /// `upi`, `card` or `netbanking`.
    #[arg(long)]
    pub method: PaymentMethod,

    #[command(flatten)]
    pub upi: UpiArgs,
    #[command(flatten)]
    pub card: CardArgs,
    #[command(flatten)]
    pub recipient: RecipientArgs,

    /// The 6-digit code sent once the payment is initiated.
    #[arg(long)]
    pub otp: String,
}

#[derive(Args, Debug, Default)]
pub struct UpiArgs {
    /// Id of a saved UPI account.
    #[arg(long, conflicts_with_all = ["new_upi", "scan_qr"])]
    pub upi: Option<String>,
    /// Add a UPI handle such as `name@bank`.
    #[arg(long, requires_all = ["upi_name", "upi_provider"])]
    pub new_upi: Option<String>,
    #[arg(long)]
    pub upi_name: Option<String>,
    #[arg(long, value_parser = PossibleValuesParser::new(UPI_PROVIDERS.iter().map(|p| p.name)))]
    pub upi_provider: Option<String>,
    /// Use the account read from the teacher's QR code.
    #[arg(long, conflicts_with = "new_upi")]
    pub scan_qr: bool,
}

#[derive(Args, Debug, Default)]
pub struct CardArgs {
    /// Id of a saved card.
    #[arg(long, conflicts_with = "card_number")]
    pub card: Option<String>,
    #[arg(long, value_parser = PossibleValuesParser::new(INDIAN_BANKS))]
    pub card_bank: Option<String>,
    /// Add a card with this number.
    #[arg(long)]
    pub card_number: Option<String>,
    #[arg(long, value_enum, default_value = "debit")]
    pub card_type: CardTypeArg,
    /// Expiry as MM/YY.
    #[arg(long)]
    pub card_expiry: Option<String>,
    #[arg(long)]
    pub card_cvv: Option<String>,
    #[arg(long)]
    pub card_zip: Option<String>,
    #[arg(long)]
    pub card_holder: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct RecipientArgs {
    /// Id of a saved recipient account.
    #[arg(long, conflicts_with = "recipient_account")]
    pub recipient: Option<String>,
    #[arg(long)]
    pub recipient_name: Option<String>,
    #[arg(long, value_parser = PossibleValuesParser::new(INDIAN_BANKS))]
    pub recipient_bank: Option<String>,
    /// Add a recipient with this account number.
    #[arg(long)]
    pub recipient_account: Option<String>,
    #[arg(long)]
    pub recipient_ifsc: Option<String>,
}

impl UpiArgs {
    fn event(self) -> Option<WizardEvent> {
        if self.scan_qr {
            return Some(WizardEvent::ScanQr);
        }
        if let Some(upi_id) = self.new_upi {
            return Some(WizardEvent::AddUpi(NewUpi {
                upi_id,
                name: self.upi_name.unwrap_or_default(),
                provider: self.upi_provider.unwrap_or_default(),
            }));
        }
        self.upi.map(WizardEvent::SelectUpi)
    }
}

impl CardArgs {
    fn event(self) -> Option<WizardEvent> {
        if let Some(card_number) = self.card_number {
            return Some(WizardEvent::AddCard(NewCard {
                bank_name: self.card_bank.unwrap_or_default(),
                card_number,
                card_type: self.card_type.into(),
                expiry_date: self.card_expiry.unwrap_or_default(),
                cvv: self.card_cvv.unwrap_or_default(),
                zip_code: self.card_zip.unwrap_or_default(),
                holder_name: self.card_holder.unwrap_or_default(),
            }));
        }
        self.card.map(WizardEvent::SelectCard)
    }
}

impl RecipientArgs {
    fn event(self) -> Option<WizardEvent> {
        if let Some(account_number) = self.recipient_account {
            return Some(WizardEvent::AddRecipient(NewRecipient {
                name: self.recipient_name.unwrap_or_default(),
                bank_name: self.recipient_bank.unwrap_or_default(),
                account_number,
                ifsc_code: self.recipient_ifsc.unwrap_or_default(),
            }));
        }
        self.recipient.map(WizardEvent::SelectRecipient)
    }
}

fn advance(session: &mut WizardSession, event: WizardEvent) -> Result<()> {
    let next = session.apply(event)?;
    debug!(step = next.current_step(), "wizard advanced");
    *session = next;
    Ok(())
}

fn advance_if(session: &mut WizardSession, event: Option<WizardEvent>) -> Result<()> {
    match event {
        Some(event) => advance(session, event),
        None => Ok(()),
    }
}

fn resolve_teacher(session: &WizardSession, key: &str) -> Result<String> {
    if session.matching_teachers("").iter().any(|t| t.id == key) {
        return Ok(key.to_string());
    }
    match session.matching_teachers(key).as_slice() {
        [teacher] => Ok(teacher.id.clone()),
        [] => Err(WizardError::UnknownTeacher(key.to_string()).into()),
        several => {
            let names: Vec<&str> = several.iter().map(|t| t.name.as_str()).collect();
            Err(StaffPayError::ValidationError(format!(
                "'{key}' matches several teachers: {}",
                names.join(", ")
            )))
        }
    }
}

/// Builds the events for every screen up to the confirmation review.
fn fill_in(args: PayArgs, session: &mut WizardSession) -> Result<String> {
    let PayArgs {
        teacher,
        amount,
        quick,
        r#type,
        description,
        method,
        upi,
        card,
        recipient,
        otp,
    } = args;

    let teacher = resolve_teacher(session, &teacher)?;
    advance(session, WizardEvent::SelectTeacher(teacher))?;
    advance(session, WizardEvent::ConfirmTeacher)?;

    advance(session, WizardEvent::SetPaymentType(r#type))?;
    advance_if(session, quick.map(|q| WizardEvent::ApplyQuickAmount(q.into())))?;
    advance_if(session, amount.map(WizardEvent::SetAmount))?;
    if !description.is_empty() {
        advance(session, WizardEvent::SetDescription(description))?;
    }
    advance(session, WizardEvent::SubmitDetails)?;

    advance(session, WizardEvent::SelectMethod(method))?;
    advance(session, WizardEvent::ConfirmMethod)?;

    match method {
        PaymentMethod::Upi => {
            advance_if(session, upi.event())?;
            advance(session, WizardEvent::ConfirmUpi)?;
        }
        PaymentMethod::Card => {
            advance_if(session, card.event())?;
            advance(session, WizardEvent::ConfirmCard)?;
            advance_if(session, recipient.event())?;
            advance(session, WizardEvent::ConfirmRecipient)?;
        }
        PaymentMethod::NetBanking => {
            advance_if(session, recipient.event())?;
            advance(session, WizardEvent::ConfirmRecipient)?;
        }
    }
    Ok(otp)
}

pub async fn run<W: Write>(args: PayArgs, ctx: &mut Context, out: &mut W) -> Result<()> {
    let mut session = WizardSession::open(ctx.roster.teachers());
    let otp = fill_in(args, &mut session)?;

    if !ctx.json
        && let Some(intent) = session.intent()
    {
        render::review(out, &intent, &session.draft().description)?;
    }

    let notice = ctx.checkout.initiate(&mut session).await?;
    render::notice(&notice);
    if notice.is_error() {
        return Err(StaffPayError::GatewayError(notice.to_string()));
    }

    advance(&mut session, WizardEvent::EnterOtp(otp))?;
    let notice = ctx.checkout.verify(&mut session, &mut ctx.ledger).await?;
    render::notice(&notice);

    match session.record() {
        Some(record) => {
            info!(transaction_id = %record.transaction_id, "wizard completed");
            if ctx.json {
                print_json(out, record)
            } else {
                render::receipt(out, record)?;
                Ok(())
            }
        }
        None => Err(StaffPayError::GatewayError(notice.to_string())),
    }
}
