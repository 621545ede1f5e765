//! HTML 页面渲染
//!
//! 所有来自用户或外部工具的字符串都经过转义后再输出。

use ammonia::clean_text;

use crate::pagekite::{ConfigureForm, FormErrors, Message, FORM_PREFIX};

/// 主菜单中的标题
pub const APP_TITLE: &str = "Public Visibility (PageKite)";

/// 链接和表单提交时携带的查询串（含前导 `?`），未配置令牌时为空
pub fn token_query(token: Option<&str>) -> String {
    match token {
        Some(t) if !t.is_empty() => format!("?token={}", urlencoding::encode(t)),
        _ => String::new(),
    }
}

fn layout(title: &str, sidebar: Option<&str>, body: &str) -> String {
    let sidebar = sidebar
        .map(|s| format!("<aside class=\"sidebar-right\">{}</aside>", s))
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n\
         <main>\n<h1>{title}</h1>\n{body}\n</main>\n\
         {sidebar}\n\
         </body>\n\
         </html>\n",
        title = title,
        body = body,
        sidebar = sidebar,
    )
}

/// 侧边菜单
fn menu_block(title: &str, items: &[(String, &str)]) -> String {
    let mut html = format!("<div class=\"menu\"><h4>{}</h4><ul>", title);
    for (url, text) in items {
        html.push_str(&format!("<li><a href=\"{}\">{}</a></li>", url, text));
    }
    html.push_str("</ul></div>");
    html
}

fn messages_block(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| {
            format!(
                "<div class=\"alert alert-{}\">{}</div>\n",
                m.level.as_str(),
                clean_text(&m.text)
            )
        })
        .collect()
}

/// 介绍页
pub fn introduction_page(token: Option<&str>) -> String {
    let query = token_query(token);
    let sidebar = menu_block(
        "PageKite",
        &[(
            format!("/apps/pagekite/configure{}", query),
            "Configure PageKite",
        )],
    );

    let body = "<p>PageKite is a system for exposing this box's services when \
                you don't have a direct connection to the Internet. You only \
                need this if your services are unreachable from the rest of \
                the Internet.</p>\n\
                <p>PageKite works around NAT, firewalls and IP address \
                limitations by using a combination of tunnels and reverse \
                proxies. Currently only <a href=\"https://pagekite.net\">\
                pagekite.net</a> is supported as the front-end relay.</p>";

    layout(APP_TITLE, Some(&sidebar), body)
}

fn field_errors(errors: &FormErrors, field: &str) -> String {
    let list = errors.get(field);
    if list.is_empty() {
        return String::new();
    }

    let items: String = list
        .iter()
        .map(|e| format!("<li>{}</li>", clean_text(e)))
        .collect();
    format!("<ul class=\"errorlist\">{}</ul>", items)
}

fn checkbox_field(
    form: &ConfigureForm,
    errors: &FormErrors,
    field: &str,
    label: &str,
    help: &str,
) -> String {
    let name = format!("{}-{}", FORM_PREFIX, field);
    let checked = if form.is_checked(field) { " checked" } else { "" };
    format!(
        "<p>{errors}<label><input type=\"checkbox\" name=\"{name}\" id=\"id_{name}\"{checked}> {label}</label>\
         <span class=\"helptext\">{help}</span></p>\n",
        errors = field_errors(errors, field),
        name = name,
        checked = checked,
        label = label,
        help = help,
    )
}

fn text_field(
    form: &ConfigureForm,
    errors: &FormErrors,
    field: &str,
    label: &str,
    help: &str,
) -> String {
    let name = format!("{}-{}", FORM_PREFIX, field);
    format!(
        "<p>{errors}<label for=\"id_{name}\">{label}</label>\
         <input type=\"text\" name=\"{name}\" id=\"id_{name}\" value=\"{value}\">\
         <span class=\"helptext\">{help}</span></p>\n",
        errors = field_errors(errors, field),
        name = name,
        label = label,
        value = clean_text(form.text(field)),
        help = help,
    )
}

/// 配置页
pub fn configure_page(
    form: &ConfigureForm,
    errors: &FormErrors,
    messages: &[Message],
    token: Option<&str>,
) -> String {
    let query = token_query(token);

    let mut body = messages_block(messages);
    body.push_str(&format!(
        "<form method=\"post\" action=\"/apps/pagekite/configure{}\">\n",
        query
    ));
    body.push_str(&checkbox_field(form, errors, "enabled", "Enable PageKite", ""));
    body.push_str(&format!(
        "<p><label for=\"id_{p}-server\">Server</label>\
         <input type=\"text\" name=\"{p}-server\" id=\"id_{p}-server\" placeholder=\"pagekite.net\" disabled>\
         <span class=\"helptext\">Currently only pagekite.net server is supported</span></p>\n",
        p = FORM_PREFIX
    ));
    body.push_str(&text_field(
        form,
        errors,
        "kite_name",
        "Kite name",
        "Example: mybox1-myacc.pagekite.me",
    ));
    body.push_str(&text_field(
        form,
        errors,
        "kite_secret",
        "Kite secret",
        "A secret associated with the kite or the default secret for your \
         account if no secret is set on the kite",
    ));
    body.push_str(&checkbox_field(
        form,
        errors,
        "http_enabled",
        "Web Server (HTTP)",
        "Site will be available at \
         <a href=\"http://mybox1-myacc.pagekite.me\">http://mybox1-myacc.pagekite.me</a>",
    ));
    body.push_str(&checkbox_field(
        form,
        errors,
        "ssh_enabled",
        "Secure Shell (SSH)",
        "See SSH client setup \
         <a href=\"https://pagekite.net/wiki/Howto/SshOverPageKite/\">instructions</a>",
    ));
    body.push_str("<input type=\"submit\" value=\"Update setup\">\n</form>");

    let sidebar = menu_block("PageKite", &[(format!("/apps/pagekite{}", query), "About PageKite")]);
    layout("Configure PageKite", Some(&sidebar), &body)
}

/// 外部工具未安装时的提示页
pub fn not_installed_page(token: Option<&str>) -> String {
    let sidebar = menu_block(
        "PageKite",
        &[(format!("/apps/pagekite{}", token_query(token)), "About PageKite")],
    );
    layout(
        "Configure PageKite",
        Some(&sidebar),
        "<p class=\"warning\">PageKite is not installed. Install the \
         pagekite package to configure it here.</p>",
    )
}

/// 通用错误页
pub fn error_page(message: &str) -> String {
    layout(
        "Error",
        None,
        &format!("<div class=\"alert alert-error\">{}</div>", clean_text(message)),
    )
}
