//! Password command: hash passwords for seeding user records.

use std::io::BufRead;

use apidoc_store::{BcryptVerifier, PasswordVerifier};

/// Print the bcrypt hash of `password`, or of the first stdin line.
pub(crate) fn hash(password: Option<String>) -> anyhow::Result<()> {
    let password = match password {
        Some(password) => password,
        None => {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_owned()
        },
    };
    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }

    println!("{}", BcryptVerifier::default().hash(&password)?);
    Ok(())
}
