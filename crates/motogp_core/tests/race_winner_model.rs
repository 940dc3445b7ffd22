use motogp_core::{RaceClass, RaceWinner, RaceWinnerValidationError};

fn quartararo() -> RaceWinner {
    RaceWinner::new(
        2021,
        "Algarve International Circuit",
        RaceClass::MotoGp,
        "Fabio Quartararo",
        "Yamaha",
        "France",
    )
}

#[test]
fn key_captures_the_four_identity_fields() {
    let winner = quartararo();
    let key = winner.key();

    assert_eq!(key.season, 2021);
    assert_eq!(key.circuit, "Algarve International Circuit");
    assert_eq!(key.class, RaceClass::MotoGp);
    assert_eq!(key.rider, "Fabio Quartararo");
}

#[test]
fn validate_accepts_empty_constructor_and_country() {
    let mut winner = quartararo();
    winner.constructor.clear();
    winner.country.clear();
    assert_eq!(winner.validate(), Ok(()));
}

#[test]
fn validate_rejects_blank_rider_and_out_of_range_season() {
    let mut blank_rider = quartararo();
    blank_rider.rider = "   ".to_string();
    assert_eq!(
        blank_rider.validate(),
        Err(RaceWinnerValidationError::MissingRequiredField)
    );

    let mut future = quartararo();
    future.season = 2030;
    assert_eq!(
        future.validate(),
        Err(RaceWinnerValidationError::SeasonOutOfRange(2030))
    );
}

#[test]
fn serialization_uses_expected_wire_fields() {
    let winner = RaceWinner::new(
        1967,
        "Isle of Man TT",
        RaceClass::Cc50,
        "Stuart Graham",
        "Suzuki",
        "United Kingdom",
    );

    let json = serde_json::to_value(&winner).unwrap();
    assert_eq!(json["season"], 1967);
    assert_eq!(json["circuit"], "Isle of Man TT");
    assert_eq!(json["class"], "50cc");
    assert_eq!(json["rider"], "Stuart Graham");
    assert_eq!(json["constructor"], "Suzuki");
    assert_eq!(json["country"], "United Kingdom");

    let decoded: RaceWinner = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, winner);
}
