use chrono::Utc;
use rand::Rng;
use rand::distributions::Alphanumeric;
use rust_decimal::Decimal;
use staffpay::domain::seed;
use staffpay::domain::wizard::{
    PaymentMethod, WizardError, WizardEvent, WizardSession, is_valid_otp,
};

const ROUNDS: usize = 200;

fn at_details() -> WizardSession {
    WizardSession::open(&seed::teachers())
        .apply(WizardEvent::SelectTeacher("2".to_string()))
        .and_then(|s| s.apply(WizardEvent::ConfirmTeacher))
        .unwrap()
}

#[test]
fn test_only_positive_amounts_pass_details() {
    let mut rng = rand::thread_rng();
    let session = at_details();
    for _ in 0..ROUNDS {
        let cents: i64 = rng.gen_range(-1_000_000..=1_000_000);
        let amount = Decimal::new(cents, 2);
        let result = session
            .apply(WizardEvent::SetAmount(amount))
            .and_then(|s| s.apply(WizardEvent::SubmitDetails));
        if amount > Decimal::ZERO {
            assert_eq!(result.unwrap().current_step(), 2, "amount {amount}");
        } else {
            assert_eq!(result.unwrap_err(), WizardError::InvalidAmount, "amount {amount}");
        }
    }
    // the refused attempts never touched the starting session
    assert_eq!(session.current_step(), 1);
    assert_eq!(session.draft().amount, Decimal::from(5200));
}

#[test]
fn test_otp_accepts_exactly_six_digits() {
    let mut rng = rand::thread_rng();
    for _ in 0..ROUNDS {
        let len = rng.gen_range(0..10);
        let digits: String = (0..len)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        assert_eq!(is_valid_otp(&digits), len == 6, "otp {digits:?}");

        let mixed: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect();
        let all_digits = mixed.bytes().all(|b| b.is_ascii_digit());
        assert_eq!(is_valid_otp(&mixed), all_digits, "otp {mixed:?}");
    }
    assert!(!is_valid_otp("１２３４５６"));
}

fn walk(method: PaymentMethod) -> Vec<u8> {
    let mut session = at_details();
    let mut steps = vec![0, session.current_step()];
    let mut events = vec![
        WizardEvent::SubmitDetails,
        WizardEvent::SelectMethod(method),
        WizardEvent::ConfirmMethod,
    ];
    match method {
        PaymentMethod::Upi => {
            events.push(WizardEvent::ScanQr);
            events.push(WizardEvent::ConfirmUpi);
        }
        PaymentMethod::Card => {
            events.push(WizardEvent::SelectCard("1".to_string()));
            events.push(WizardEvent::ConfirmCard);
            events.push(WizardEvent::SelectRecipient("1".to_string()));
            events.push(WizardEvent::ConfirmRecipient);
        }
        PaymentMethod::NetBanking => {
            events.push(WizardEvent::SelectRecipient("2".to_string()));
            events.push(WizardEvent::ConfirmRecipient);
        }
    }
    for event in events {
        session = session.apply(event).unwrap();
        if steps.last() != Some(&session.current_step()) {
            steps.push(session.current_step());
        }
    }

    // back retraces the same path
    let mut back = vec![session.current_step()];
    while session.current_step() > 0 {
        session = session.apply(WizardEvent::Back).unwrap();
        back.push(session.current_step());
    }
    back.reverse();
    assert_eq!(back, steps);
    steps
}

#[test]
fn test_step_sequence_per_method() {
    assert_eq!(walk(PaymentMethod::Upi), vec![0, 1, 2, 3, 6]);
    assert_eq!(walk(PaymentMethod::Card), vec![0, 1, 2, 4, 5, 6]);
    assert_eq!(walk(PaymentMethod::NetBanking), vec![0, 1, 2, 5, 6]);
}

#[test]
fn test_random_event_streams_never_skip_validation() {
    let mut rng = rand::thread_rng();
    for _ in 0..ROUNDS {
        let mut session = WizardSession::open(&seed::teachers());
        for _ in 0..40 {
            let event = match rng.gen_range(0..12) {
                0 => WizardEvent::SelectTeacher(rng.gen_range(1..=4).to_string()),
                1 => WizardEvent::ConfirmTeacher,
                2 => WizardEvent::SetAmount(Decimal::from(rng.gen_range(-100..5000))),
                3 => WizardEvent::SubmitDetails,
                4 => WizardEvent::SelectMethod(match rng.gen_range(0..3) {
                    0 => PaymentMethod::Upi,
                    1 => PaymentMethod::Card,
                    _ => PaymentMethod::NetBanking,
                }),
                5 => WizardEvent::ConfirmMethod,
                6 => WizardEvent::SelectUpi(rng.gen_range(1..=3).to_string()),
                7 => WizardEvent::ConfirmUpi,
                8 => WizardEvent::SelectCard(rng.gen_range(1..=3).to_string()),
                9 => WizardEvent::ConfirmCard,
                10 => WizardEvent::SelectRecipient(rng.gen_range(1..=3).to_string()),
                _ => WizardEvent::Back,
            };
            if let Ok(next) = session.apply(event) {
                session = next;
            }

            let step = session.current_step();
            if step >= 1 {
                assert!(session.teacher().is_some_and(|t| t.is_active()));
            }
            if step >= 2 {
                assert!(session.draft().amount > Decimal::ZERO);
            }
            if step >= 3 {
                assert!(session.method().is_some());
            }
            if step == 6 {
                assert!(session.intent().is_some());
            }
            assert!(!session.is_complete());
        }
    }
}

#[test]
fn test_completion_requires_gateway_events() {
    let mut session = at_details();
    for event in [
        WizardEvent::SubmitDetails,
        WizardEvent::SelectMethod(PaymentMethod::Upi),
        WizardEvent::ConfirmMethod,
        WizardEvent::SelectUpi("1".to_string()),
        WizardEvent::ConfirmUpi,
    ] {
        session = session.apply(event).unwrap();
    }
    assert!(
        session
            .apply(WizardEvent::VerificationSucceeded { at: Utc::now() })
            .is_err()
    );
    assert!(session.apply(WizardEvent::EnterOtp("123456".to_string())).is_err());
}
