//! Server-rendered HTML pages. Every interpolated value goes through [`escape`].

use std::fmt::Write;

use helpdesk_types::forms::{FieldError, errors_for};
use helpdesk_types::models::Message;

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n{body}</body>\n</html>\n",
        title = escape(title),
    )
}

fn banner(error: Option<&str>) -> String {
    error
        .map(|e| format!("<p class=\"error\">{}</p>\n", escape(e)))
        .unwrap_or_default()
}

fn field(label: &str, name: &str, kind: &str, value: &str, errors: &[FieldError]) -> String {
    let mut html = format!(
        "<p><label for=\"{name}\">{label}</label>\n<input type=\"{kind}\" id=\"{name}\" name=\"{name}\" value=\"{value}\">\n",
        label = escape(label),
        value = escape(value),
    );
    for msg in errors_for(errors, name) {
        let _ = writeln!(html, "<span class=\"error\">{}</span>", escape(msg));
    }
    html.push_str("</p>\n");
    html
}

fn form(action: &str, fields: &str, submit: &str) -> String {
    format!(
        "<form method=\"post\" action=\"{action}\">\n{fields}<button type=\"submit\">{submit}</button>\n</form>\n"
    )
}

fn message_table(messages: &[Message], with_actions: bool) -> String {
    if messages.is_empty() {
        return "<p>No messages.</p>\n".to_string();
    }

    let mut html = String::from(
        "<table>\n<tr><th>ID</th><th>User ID</th><th>Timestamp</th><th>Message</th><th>Response</th>",
    );
    if with_actions {
        html.push_str("<th></th>");
    }
    html.push_str("</tr>\n");

    for m in messages {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
            m.id,
            m.user_id,
            escape(&m.timestamp),
            escape(&m.message_body),
            m.response.as_deref().map(escape).unwrap_or_default(),
        );
        if with_actions {
            let _ = write!(html, "<td><a href=\"/respond/{}\">Respond</a></td>", m.id);
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");
    html
}

// -- Auth --

pub fn login_page(error: Option<&str>, errors: &[FieldError]) -> String {
    let fields = field("Username", "username", "text", "", errors)
        + &field("Password", "password", "password", "", errors);
    let body = banner(error)
        + &form("/login", &fields, "Log in")
        + "<p><a href=\"/register\">Register</a></p>\n";
    page("Agent login", &body)
}

pub fn register_page(error: Option<&str>, errors: &[FieldError]) -> String {
    let fields = field("Username", "username", "text", "", errors)
        + &field("Password", "password", "password", "", errors);
    let body = banner(error)
        + &form("/register", &fields, "Register")
        + "<p><a href=\"/login\">Log in</a></p>\n";
    page("Register", &body)
}

// -- Customer forms --

pub fn send_message_page(user_id: &str, message_body: &str, errors: &[FieldError]) -> String {
    let fields = field("User ID", "user_id", "text", user_id, errors)
        + &field("Message Body", "message_body", "text", message_body, errors);
    page("Send message", &form("/send_message", &fields, "Send Message"))
}

pub fn receive_message_page(user_id: &str, errors: &[FieldError]) -> String {
    let fields = field("User ID", "user_id", "text", user_id, errors);
    page("Receive messages", &form("/receive_message", &fields, "Receive Messages"))
}

pub fn received_messages_page(user_id: i64, messages: &[Message]) -> String {
    page(
        &format!("Messages for user {user_id}"),
        &message_table(messages, false),
    )
}

// -- Agent portal --

pub fn portal_page(agent: &str, messages: &[Message]) -> String {
    let body = format!(
        "<p>Signed in as {}. <a href=\"/search\">Search</a> <a href=\"/logout\">Log out</a></p>\n{}",
        escape(agent),
        message_table(messages, true),
    );
    page("Agent portal", &body)
}

pub fn search_page(keyword: &str, errors: &[FieldError]) -> String {
    let fields = field("Keyword", "keyword", "text", keyword, errors);
    page("Search messages", &form("/search", &fields, "Search"))
}

pub fn search_results_page(keyword: &str, messages: &[Message]) -> String {
    let fields = field("Keyword", "keyword", "text", keyword, &[]);
    let body = form("/search", &fields, "Search")
        + &format!("<p>{} result(s) for &quot;{}&quot;</p>\n", messages.len(), escape(keyword))
        + &message_table(messages, true);
    page("Search results", &body)
}

pub fn respond_page(message: &Message, errors: &[FieldError]) -> String {
    let current = message.response.as_deref().unwrap_or_default();
    let body = format!(
        "<p>From user {}: {}</p>\n{}",
        message.user_id,
        escape(&message.message_body),
        form(
            &format!("/respond/{}", message.id),
            &field("Response", "response", "text", current, errors),
            "Send Response",
        ),
    );
    page(&format!("Respond to message {}", message.id), &body)
}
