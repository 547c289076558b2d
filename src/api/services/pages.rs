//! 访客侧 HTML 页面
//!
//! 404 / 密码输入 / pending / 插页四种最小化服务端渲染页面。
//! 仪表盘前端独立托管，这里只服务跳转路径上的访客。

use actix_web::HttpResponse;
use actix_web::http::StatusCode;

use crate::api::constants::INTERSTITIAL_SECONDS;
use crate::services::resolver::SocialCard;

/// HTML 属性/文本转义
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn html_response(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header(("Content-Type", "text/html; charset=utf-8"))
        .body(body)
}

/// 404 页面（短码不存在 / 未启用 / 窗口外统一走这里）
pub fn not_found_response() -> HttpResponse {
    HttpResponse::build(StatusCode::NOT_FOUND)
        .insert_header(("Content-Type", "text/html; charset=utf-8"))
        .insert_header(("Cache-Control", "public, max-age=60"))
        .body(
            "<!DOCTYPE html><html><head><title>Not Found</title></head>\
             <body><h1>404</h1><p>This link does not exist.</p></body></html>",
        )
}

/// pending 页面：链接已创建但还没有目标
pub fn pending_page() -> HttpResponse {
    html_response(
        StatusCode::OK,
        "<!DOCTYPE html><html><head><title>Almost ready</title>\
         <meta name=\"robots\" content=\"noindex\"></head>\
         <body style=\"font-family:sans-serif;text-align:center;padding-top:4rem\">\
         <h1>This link isn't ready yet</h1>\
         <p>The owner hasn't pointed it anywhere. Check back soon.</p>\
         </body></html>"
            .to_string(),
    )
}

/// 密码输入页面，表单回传到 /{code}/unlock
pub fn password_page(code: &str, wrong_password: bool) -> HttpResponse {
    let code = html_escape(code);
    let error_html = if wrong_password {
        "<p style=\"color:#c00\">Wrong password, try again.</p>"
    } else {
        ""
    };

    html_response(
        StatusCode::OK,
        format!(
            "<!DOCTYPE html><html><head><title>Password required</title>\
             <meta name=\"robots\" content=\"noindex\"></head>\
             <body style=\"font-family:sans-serif;text-align:center;padding-top:4rem\">\
             <h1>This link is protected</h1>\
             {error_html}\
             <form method=\"post\" action=\"/{code}/unlock\">\
             <input type=\"password\" name=\"password\" placeholder=\"Password\" autofocus>\
             <button type=\"submit\">Unlock</button>\
             </form>\
             </body></html>"
        ),
    )
}

/// 插页：社交卡片 meta + 倒计时自动跳转
pub fn interstitial_page(target_url: &str, card: &SocialCard) -> HttpResponse {
    let url = html_escape(target_url);
    let seconds = INTERSTITIAL_SECONDS;

    let mut meta = String::new();
    if let Some(ref title) = card.title {
        meta.push_str(&format!(
            "<meta property=\"og:title\" content=\"{}\">",
            html_escape(title)
        ));
    }
    if let Some(ref description) = card.description {
        meta.push_str(&format!(
            "<meta property=\"og:description\" content=\"{}\">",
            html_escape(description)
        ));
    }
    if let Some(ref image) = card.image {
        meta.push_str(&format!(
            "<meta property=\"og:image\" content=\"{}\">",
            html_escape(image)
        ));
    }

    html_response(
        StatusCode::OK,
        format!(
            "<!DOCTYPE html><html><head><title>Redirecting...</title>\
             {meta}\
             <meta http-equiv=\"refresh\" content=\"{seconds};url={url}\"></head>\
             <body style=\"font-family:sans-serif;text-align:center;padding-top:4rem\">\
             <h1>Redirecting you...</h1>\
             <p>You are being redirected to</p>\
             <p><code>{url}</code></p>\
             <p>Automatic redirect in {seconds}s</p>\
             <p><a href=\"{url}\">Click here if you are not redirected</a></p>\
             </body></html>"
        ),
    )
}
