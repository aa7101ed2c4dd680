//! Message Templates
//!
//! Every template renders a plain-text body and an HTML body. Values that come
//! from users are HTML-escaped before they reach the HTML body.

use crate::Email;

const BRAND: &str = "ServiLog";
const TAGLINE: &str = "Smart Maintenance, Smooth Journey.";

/// Vehicle fields shown in reminders
#[derive(Debug, Clone)]
pub struct VehicleSummary {
    pub name: String,
    pub brand: String,
    pub model: String,
}

/// Part fields shown in reminders
#[derive(Debug, Clone)]
pub struct PartSummary {
    pub name: String,
    pub brand: String,
    pub model: String,
    pub install_mileage: i64,
    pub lifetime_mileage: i64,
}

/// Everything a maintenance reminder talks about
#[derive(Debug, Clone)]
pub struct MaintenanceNotice {
    pub to: String,
    pub account_name: String,
    pub vehicle: VehicleSummary,
    pub part: PartSummary,
    pub current_mileage: i64,
}

/// Escape text for inclusion in HTML
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, heading: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title} - {BRAND}</title>
</head>
<body style="font-family: Arial, sans-serif; background-color: #ffffff; margin: 0; padding: 0; color: #333;">
<div style="max-width: 600px; margin: 0 auto; border: 1px solid #e6e6e6; border-radius: 8px; overflow: hidden;">
<div style="background-color: #FECB00; color: #D52B1E; text-align: center; padding: 20px;">
<h1 style="margin: 0; font-size: 24px;">{heading}</h1>
</div>
<div style="padding: 20px; font-size: 16px; line-height: 1.5;">
{body}
</div>
<div style="text-align: center; font-size: 14px; color: #888; padding: 10px 20px; background-color: #f8f9fa;">
<p>&copy; {BRAND}. {TAGLINE}</p>
</div>
</div>
</body>
</html>"#
    )
}

fn details_block(notice: &MaintenanceNotice, part_label: &str, accent: &str) -> String {
    let v = &notice.vehicle;
    let p = &notice.part;
    format!(
        r#"<div style="background-color: {accent}; padding: 15px; border-radius: 6px; margin-bottom: 15px;">
<strong>Vehicle Details:</strong><br>
Name: {}<br>
Brand: {}<br>
Model: {}<br>
Current Mileage: {} KM
</div>
<div style="background-color: {accent}; padding: 15px; border-radius: 6px; margin-bottom: 15px;">
<strong>{part_label}:</strong><br>
Name: {}<br>
Brand: {}<br>
Model: {}<br>
Installed On: {} KM<br>
Lifetime: {} KM
</div>"#,
        escape_html(&v.name),
        escape_html(&v.brand),
        escape_html(&v.model),
        notice.current_mileage,
        escape_html(&p.name),
        escape_html(&p.brand),
        escape_html(&p.model),
        p.install_mileage,
        p.lifetime_mileage,
    )
}

fn details_text(notice: &MaintenanceNotice, part_label: &str) -> String {
    let v = &notice.vehicle;
    let p = &notice.part;
    format!(
        "Vehicle:\n- Name: {}\n- Brand: {}\n- Model: {}\n- Current Mileage: {} KM\n\n\
         {part_label}:\n- Name: {}\n- Brand: {}\n- Model: {}\n- Installed On: {} KM\n- Lifetime: {} KM",
        v.name,
        v.brand,
        v.model,
        notice.current_mileage,
        p.name,
        p.brand,
        p.model,
        p.install_mileage,
        p.lifetime_mileage,
    )
}

/// Account verification email with a link back to the web client
pub fn verification_email(to: &str, account_name: &str, verify_link: &str) -> Email {
    let text = format!(
        "Hello, {account_name}\n\n\
         Thank you for registering at {BRAND}, the trusted vehicle maintenance tracking platform.\n\n\
         To activate your account, please open the following link:\n{verify_link}\n\n\
         If you did not register for an account, please ignore this email.\n\n\
         {BRAND}. {TAGLINE}"
    );
    let body = format!(
        r#"<p>Hello, <strong>{name}</strong>!</p>
<p>Thank you for registering at <strong>{BRAND}</strong>, the trusted vehicle maintenance tracking platform.</p>
<p>To activate your account, please click the button below:</p>
<p style="text-align: center; margin: 20px 0;">
<a href="{link}" style="display: inline-block; font-size: 20px; font-weight: bold; background-color: #D52B1E; padding: 15px 30px; border-radius: 8px; color: #ffffff; text-decoration: none;">Verify Account</a>
</p>
<p>If you did not register for an account, please ignore this email.</p>
<p>Best regards,<br>The {BRAND} Team</p>"#,
        name = escape_html(account_name),
        link = escape_html(verify_link),
    );

    Email {
        to: to.to_string(),
        subject: format!("Account Verification for {BRAND}"),
        text,
        html: layout("Account Verification", &format!("Welcome to {BRAND}!"), &body),
    }
}

/// Reminder that a part is predicted to wear out within `horizon_days`
pub fn maintenance_due_email(notice: &MaintenanceNotice, horizon_days: u32) -> Email {
    let text = format!(
        "Hello, {}\n\n\
         Based on your driving pattern, a part on your vehicle will require maintenance within {horizon_days} days.\n\n\
         {}\n\n\
         Please prepare to replace this part to ensure optimal vehicle performance and safety.\n\n\
         Best regards,\nThe {BRAND} Team",
        notice.account_name,
        details_text(notice, "Part"),
    );
    let body = format!(
        r#"<p>Hello, <strong>{}</strong>!</p>
<p>Based on your driving behavior, our system estimates that one of your vehicle's parts will require maintenance within the next {horizon_days} days.</p>
{}
<p>Please consider servicing or replacing this part soon to ensure optimal performance and safety.</p>
<p>Stay safe and thank you for using <strong>{BRAND}</strong>.</p>"#,
        escape_html(&notice.account_name),
        details_block(notice, "Part Details", "#f2f2f2"),
    );

    Email {
        to: notice.to.clone(),
        subject: format!("Maintenance Reminder for Your Vehicle - {BRAND}"),
        text,
        html: layout("Maintenance Reminder", "Maintenance Reminder", &body),
    }
}

/// Alert that a part has passed its lifetime mileage
pub fn maintenance_overdue_email(notice: &MaintenanceNotice) -> Email {
    let text = format!(
        "Hello, {}\n\n\
         One of the parts in your vehicle has exceeded its lifetime mileage limit and requires immediate maintenance.\n\n\
         {}\n\n\
         Please take action as soon as possible to maintain the safety and performance of your vehicle.\n\n\
         Best regards,\nThe {BRAND} Team",
        notice.account_name,
        details_text(notice, "Overdue Part"),
    );
    let body = format!(
        r#"<p>Hello, <strong>{}</strong>!</p>
<p>Our system has detected that one of the parts in your vehicle has exceeded its lifetime mileage limit and <strong>requires immediate maintenance</strong>.</p>
{}
<p>Please schedule a service as soon as possible to avoid potential breakdowns or further damage.</p>
<p>Stay safe,<br>The {BRAND} Team</p>"#,
        escape_html(&notice.account_name),
        details_block(notice, "Overdue Part Details", "#fff4f4"),
    );

    Email {
        to: notice.to.clone(),
        subject: format!("Urgent Maintenance Reminder for Your Vehicle - {BRAND}"),
        text,
        html: layout("Overdue Maintenance Alert", "Overdue Maintenance Alert", &body),
    }
}
