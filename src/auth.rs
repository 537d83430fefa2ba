use anyhow::{Result, bail};
use std::io::{self, BufRead, IsTerminal};
use zeroize::Zeroizing;

/// Environment variable consulted before stdin and the terminal.
const ENV_PASSWORD: &str = "PWCRYPT_PASSWORD";

pub fn read_password() -> Result<Zeroizing<String>> {
    //  Environment Variable
    //  PWCRYPT_PASSWORD="supersecret" pwcrypt verify '$2a$10$...'
    if let Ok(pw) = std::env::var(ENV_PASSWORD) {
        return Ok(Zeroizing::new(pw));
    }

    //  stdin (Pipeline)
    //  printf "%s\n" "$SECRET" | pwcrypt hash
    if !io::stdin().is_terminal() {
        let mut pw = Zeroizing::new(String::new());
        io::stdin().lock().read_line(&mut pw)?;
        trim_newline(&mut pw);
        return Ok(pw);
    }

    //  Interactive (TTY)
    Ok(Zeroizing::new(rpassword::prompt_password("Password: ")?))
}

/// Like [`read_password`], but asks twice on a terminal.
pub fn read_new_password_with_confirmation() -> Result<Zeroizing<String>> {
    if std::env::var_os(ENV_PASSWORD).is_some() || !io::stdin().is_terminal() {
        return read_password();
    }

    let pw1 = Zeroizing::new(rpassword::prompt_password("New password: ")?);
    let pw2 = Zeroizing::new(rpassword::prompt_password("Confirm password: ")?);

    if pw1 != pw2 {
        bail!("passwords do not match");
    }

    Ok(pw1)
}

fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}
