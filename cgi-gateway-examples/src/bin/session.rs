//! Cookie-backed sign-in.
//!
//! - `?user=<name>` stores the name in a cookie and redirects to the script
//! - `?logout` clears the cookie and redirects to the script
//! - otherwise greets the signed-in user or shows a sign-in form

use cgi_gateway::prelude::*;

const SESSION_COOKIE: &str = "user";

fn session_cookie(value: &str) -> Cookie {
    Cookie::new(SESSION_COOKIE, value).path("/")
}

fn valid_user(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
}

fn session(cgi: &mut Cgi) -> Result<CgiResult, CgiError> {
    let home = cgi.gets(|s| s.env.prog_uri());

    if cgi.get_input("logout").is_some() {
        cgi.delete_cookie(&session_cookie(""));
        cgi.log("session ended");
        return Ok(redirect(home));
    }

    if let Some(user) = cgi.get_input("user") {
        if !valid_user(&user) {
            return Err(CgiError::InvalidInput {
                name: "user".to_string(),
                message: "must be a non-empty alphanumeric name".to_string(),
            });
        }
        cgi.set_cookie(&session_cookie(&user));
        cgi.log(&format!("session started for {user}"));
        return Ok(redirect(home));
    }

    let page = match cgi.get_cookie(SESSION_COOKIE) {
        Some(user) if valid_user(&user) => {
            format!("<html><body><p>Welcome back, {user}.</p><a href=\"{home}?logout\">Sign out</a></body></html>\n")
        }
        _ => format!(
            "<html><body><form action=\"{home}\"><input name=\"user\"><button>Sign in</button></form></body></html>\n"
        ),
    };
    Ok(output(page))
}

fn main() -> anyhow::Result<()> {
    cgi_gateway_examples::init_tracing();
    cgi_gateway::run_stdio(handle_errors(session))?;
    Ok(())
}
