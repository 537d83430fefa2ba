use assert_cmd::Command;
use predicates::prelude::*;

const SALT4: &str = "$2a$04$......................";
const HASH4: &str = "$2a$04$......................LAtw7/ohmmBAhnXqmkuIz83Rl5Qdjhm";

fn bin() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pwcrypt"));
    cmd.env_remove("PWCRYPT_COST")
        .env_remove("PWCRYPT_ENCODING")
        .env_remove("PWCRYPT_ROUNDS_PER_SLICE")
        .env_remove("PWCRYPT_PASSWORD");
    cmd
}

#[test]
fn salt_prints_setting() {
    bin()
        .arg("salt")
        .arg("--cost")
        .arg("4")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\$2a\$04\$[./A-Za-z0-9]{21}[.Oeu]\n$").unwrap());
}

#[test]
fn salt_uses_cost_from_environment() {
    bin()
        .env("PWCRYPT_COST", "5")
        .arg("salt")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("$2a$05$"));
}

#[test]
fn salt_rejects_bad_cost() {
    bin()
        .arg("salt")
        .arg("--cost")
        .arg("32")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cost"));
}

#[test]
fn hash_with_explicit_salt() {
    bin()
        .env("PWCRYPT_PASSWORD", "password")
        .arg("hash")
        .arg("--salt")
        .arg(SALT4)
        .assert()
        .success()
        .stdout(format!("{HASH4}\n"));
}

#[test]
fn hash_reads_password_from_stdin() {
    bin()
        .arg("hash")
        .arg("--salt")
        .arg(SALT4)
        .write_stdin("password\n")
        .assert()
        .success()
        .stdout(format!("{HASH4}\n"));
}

#[test]
fn hash_with_progress() {
    bin()
        .env("PWCRYPT_PASSWORD", "password")
        .arg("hash")
        .arg("--salt")
        .arg(SALT4)
        .arg("--progress")
        .assert()
        .success()
        .stdout(format!("{HASH4}\n"))
        .stderr(predicate::str::contains("100%"));
}

#[test]
fn hash_rejects_bad_salt() {
    bin()
        .env("PWCRYPT_PASSWORD", "password")
        .arg("hash")
        .arg("--salt")
        .arg("$2z$04$......................")
        .assert()
        .failure()
        .stderr(predicate::str::contains("salt"));
}

#[test]
fn verify_match_and_mismatch() {
    bin()
        .env("PWCRYPT_PASSWORD", "password")
        .arg("verify")
        .arg(HASH4)
        .assert()
        .success()
        .stdout(predicate::str::contains("match"));

    bin()
        .env("PWCRYPT_PASSWORD", "wrong")
        .arg("verify")
        .arg(HASH4)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("mismatch"));
}

#[test]
fn verify_raw_encoding() {
    bin()
        .env("PWCRYPT_PASSWORD", "\u{a3}")
        .arg("--encoding")
        .arg("raw")
        .arg("verify")
        .arg("$2a$05$/OK.fbVrR/bpIqNJ5ianF.Sa7shbm4.OzKpvFnX1pQLmQW96oUlCq")
        .assert()
        .success();
}
