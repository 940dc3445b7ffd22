use motogp_core::{
    RaceClass, RaceWinner, RaceWinnerKey, RaceWinnerRepository, RaceWinnerValidationError,
    RepoError, SqliteRaceWinnerRepository, WinnerListQuery,
};

fn winner(season: i64, circuit: &str, class: RaceClass, rider: &str) -> RaceWinner {
    RaceWinner::new(season, circuit, class, rider, "Honda", "Spain")
}

fn list_all(repo: &SqliteRaceWinnerRepository) -> Vec<RaceWinner> {
    repo.list_winners(&WinnerListQuery::default()).unwrap()
}

fn algarve_2021() -> RaceWinner {
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
fn insert_then_list_contains_exactly_one_equal_row() {
    let repo = SqliteRaceWinnerRepository::open_in_memory().unwrap();
    let record = winner(2014, "Jerez", RaceClass::MotoGp, "Marc Marquez");

    repo.insert_winner(&record).unwrap();

    let rows = list_all(&repo);
    assert_eq!(rows.iter().filter(|row| **row == record).count(), 1);
}

#[test]
fn duplicate_insert_is_rejected_and_store_keeps_one_row() {
    let repo = SqliteRaceWinnerRepository::open_in_memory().unwrap();
    let record = winner(2014, "Jerez", RaceClass::MotoGp, "Marc Marquez");
    repo.insert_winner(&record).unwrap();

    let mut same_key = record.clone();
    same_key.constructor = "Ducati".to_string();
    let err = repo.insert_winner(&same_key).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateKey(ref key) if *key == record.key()));

    let rows = list_all(&repo);
    assert_eq!(rows, vec![record]);
}

#[test]
fn insert_rejects_invalid_record_before_touching_store() {
    let repo = SqliteRaceWinnerRepository::open_in_memory().unwrap();
    let record = winner(1930, "Monza", RaceClass::Cc500, "Nobody");

    let err = repo.insert_winner(&record).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(RaceWinnerValidationError::SeasonOutOfRange(1930))
    ));
    assert!(list_all(&repo).is_empty());
}

#[test]
fn update_into_other_existing_key_is_rejected_and_store_unchanged() {
    let repo = SqliteRaceWinnerRepository::open_in_memory().unwrap();
    let first = winner(2015, "Misano", RaceClass::Moto2, "Johann Zarco");
    let second = winner(2016, "Misano", RaceClass::Moto2, "Johann Zarco");
    repo.insert_winner(&first).unwrap();
    repo.insert_winner(&second).unwrap();
    let before = list_all(&repo);

    let mut collide = second.clone();
    collide.season = 2015;
    let err = repo.update_winner(&second.key(), &collide).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateKey(ref key) if *key == first.key()));

    assert_eq!(list_all(&repo), before);
}

#[test]
fn update_can_rewrite_key_fields_in_place() {
    let repo = SqliteRaceWinnerRepository::open_in_memory().unwrap();
    let original = winner(2016, "Sachsenring", RaceClass::Moto3, "Khairul Pawi");
    repo.insert_winner(&original).unwrap();

    let updated = RaceWinner::new(
        2016,
        "Sepang",
        RaceClass::Moto3,
        "Khairul Idham Pawi",
        "Honda",
        "Malaysia",
    );
    repo.update_winner(&original.key(), &updated).unwrap();

    assert_eq!(list_all(&repo), vec![updated]);
}

#[test]
fn update_with_unknown_original_key_reports_not_found() {
    let repo = SqliteRaceWinnerRepository::open_in_memory().unwrap();
    let record = winner(2010, "Assen", RaceClass::MotoGp, "Ben Spies");
    let missing = RaceWinnerKey {
        season: 2010,
        circuit: "Assen".to_string(),
        class: RaceClass::MotoGp,
        rider: "Someone Else".to_string(),
    };

    let err = repo.update_winner(&missing, &record).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(ref key) if *key == missing));
    assert!(list_all(&repo).is_empty());
}

#[test]
fn delete_of_missing_key_succeeds_and_leaves_store_unchanged() {
    let repo = SqliteRaceWinnerRepository::open_in_memory().unwrap();
    let record = winner(2003, "Welkom", RaceClass::MotoGp, "Valentino Rossi");
    repo.insert_winner(&record).unwrap();

    let mut missing = record.key();
    missing.season = 2004;
    assert_eq!(repo.delete_winner(&missing).unwrap(), 0);
    assert_eq!(list_all(&repo), vec![record.clone()]);

    assert_eq!(repo.delete_winner(&record.key()).unwrap(), 1);
    assert!(list_all(&repo).is_empty());
}

#[test]
fn circuit_search_is_case_sensitive_substring_with_stable_order() {
    let repo = SqliteRaceWinnerRepository::open_in_memory().unwrap();
    let rows = [
        winner(2005, "Circuit de Spa-Francorchamps", RaceClass::Cc250, "A"),
        winner(2007, "spa old layout", RaceClass::Cc125, "B"),
        winner(2007, "Aspach espana", RaceClass::Cc125, "C"),
        winner(2009, "Misano", RaceClass::Cc250, "D"),
        winner(2007, "Zandspa ring", RaceClass::MotoGp, "E"),
    ];
    for row in &rows {
        repo.insert_winner(row).unwrap();
    }

    let matched = repo
        .list_winners(&WinnerListQuery::new("spa", "All"))
        .unwrap();
    let circuits: Vec<(i64, &str)> = matched
        .iter()
        .map(|row| (row.season, row.circuit.as_str()))
        .collect();
    assert_eq!(
        circuits,
        vec![
            (2007, "Aspach espana"),
            (2007, "Zandspa ring"),
            (2007, "spa old layout"),
        ]
    );
}

#[test]
fn class_filter_matches_label_exactly() {
    let repo = SqliteRaceWinnerRepository::open_in_memory().unwrap();
    repo.insert_winner(&winner(2020, "Jerez", RaceClass::MotoGp, "Fabio Quartararo"))
        .unwrap();
    repo.insert_winner(&winner(2020, "Jerez", RaceClass::Moto2, "Jorge Martin"))
        .unwrap();
    repo.insert_winner(&winner(2019, "Losail", RaceClass::MotoGp, "Andrea Dovizioso"))
        .unwrap();

    let rows = repo
        .list_winners(&WinnerListQuery::new("", "MotoGP"))
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row.class == RaceClass::MotoGp));
    assert_eq!(rows[0].season, 2020);
    assert_eq!(rows[1].season, 2019);

    let lowercase = repo
        .list_winners(&WinnerListQuery::new("", "motogp"))
        .unwrap();
    assert!(lowercase.is_empty());
}

#[test]
fn algarve_insert_update_delete_scenario() {
    let repo = SqliteRaceWinnerRepository::open_in_memory().unwrap();
    let inserted = algarve_2021();
    repo.insert_winner(&inserted).unwrap();

    let found = repo
        .list_winners(&WinnerListQuery::new("Algarve", "All"))
        .unwrap();
    assert_eq!(found, vec![inserted.clone()]);

    let mut renamed = inserted.clone();
    renamed.circuit = "Algarve".to_string();
    repo.update_winner(&inserted.key(), &renamed).unwrap();

    let motogp = repo
        .list_winners(&WinnerListQuery::new("", "MotoGP"))
        .unwrap();
    assert_eq!(motogp.len(), 1);
    assert_eq!(motogp[0].circuit, "Algarve");

    let key = RaceWinnerKey {
        season: 2021,
        circuit: "Algarve".to_string(),
        class: RaceClass::MotoGp,
        rider: "Fabio Quartararo".to_string(),
    };
    repo.delete_winner(&key).unwrap();

    assert!(!list_all(&repo)
        .iter()
        .any(|row| row.season == 2021 && row.rider == "Fabio Quartararo"));
}

#[test]
fn distinct_values_are_sorted_and_skip_empty_and_null() {
    let repo = SqliteRaceWinnerRepository::open_in_memory().unwrap();
    repo.insert_winner(&winner(2018, "Mugello", RaceClass::Moto3, "Jorge Martin"))
        .unwrap();
    repo.insert_winner(&winner(2018, "Mugello", RaceClass::Moto2, "Miguel Oliveira"))
        .unwrap();
    repo.insert_winner(&winner(2017, "Mugello", RaceClass::Moto3, "Andrea Migno"))
        .unwrap();

    let mut no_country = winner(2017, "Brno", RaceClass::Moto2, "Thomas Luthi");
    no_country.country.clear();
    repo.insert_winner(&no_country).unwrap();

    let mut italian = winner(2016, "Mugello", RaceClass::Moto2, "Lorenzo Baldassarri");
    italian.country = "Italy".to_string();
    repo.insert_winner(&italian).unwrap();

    assert_eq!(repo.distinct_classes().unwrap(), vec!["Moto2", "Moto3"]);
    assert_eq!(repo.distinct_countries().unwrap(), vec!["Italy", "Spain"]);
}
