//! 页面模板
//!
//! 所有变量默认经过HTML转义，只有预先渲染好的详情片段使用 `{{{detail}}}` 原样输出。

use common::Result;
use handlebars::Handlebars;

pub const PAGE_TEMPLATE: &str = "page";
pub const DETAIL_TEMPLATE: &str = "detail";
const ACTION_PARTIAL: &str = "action";

const ACTION: &str = r#"{{#if route}}<form method="post" action="{{route}}" class="inline">{{#each fields}}<input type="hidden" name="{{name}}" value="{{value}}">{{/each}}<button type="submit" class="btn btn-{{style}} btn-xs"><i class="fa fa-{{icon}}"></i><span>{{label}}</span></button></form>{{else}}<button type="button" class="btn btn-{{style}} btn-xs" disabled><i class="fa fa-{{icon}}"></i><span>{{label}}</span></button>{{/if}}"#;

const DETAIL: &str = r#"<div class="service-detail" data-service="{{service_name}}">
<table class="table providers"><caption>providers</caption><thead><tr><th>address</th><th>weight</th><th>can degrade</th><th>degraded</th><th>review state</th><th>calls</th><th>failures</th><th>success ratio</th><th>actions</th></tr></thead><tbody>
{{#each providers}}<tr><td>{{address}}</td><td>{{weight}}</td><td>{{can_degrade}}</td><td>{{degraded}}</td><td>{{review_state}}</td><td>{{call_count}}</td><td>{{fail_count}}</td><td>{{success_ratio}}</td><td>{{#each actions}}{{> action}}{{/each}}</td></tr>
{{/each}}</tbody></table>
<table class="table consumers"><caption>consumers</caption><thead><tr><th>address</th></tr></thead><tbody>
{{#if consumers}}{{#each consumers}}<tr><td>{{this}}</td></tr>
{{/each}}{{else}}<tr><td>{{placeholder}}</td></tr>
{{/if}}</tbody></table>
</div>"#;

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Service Monitor</title>
<style>
body { font-family: sans-serif; margin: 20px; }
table { border-collapse: collapse; width: 100%; margin-bottom: 12px; }
th, td { text-align: center; vertical-align: middle; padding: 6px; border-bottom: 1px solid #ddd; }
tr.selected { background: #eef6ff; }
form.inline { display: inline; }
.notice-success { color: #2e7d32; } .notice-warning { color: #ef6c00; } .notice-error { color: #c62828; }
</style>
</head>
<body>
<form method="post" action="/search" class="inline">
<input type="text" name="search" value="{{search_key}}" placeholder="service name">
<button id="searchBtn" type="submit"{{#if loading}} disabled{{/if}}>{{#if loading}}loading...{{else}}search{{/if}}</button>
</form>
<form method="get" action="/page" class="inline">
<input type="hidden" name="index" value="0">
<select name="size">{{#each page_sizes}}<option value="{{size}}"{{#if selected}} selected{{/if}}>{{size}}</option>{{/each}}</select>
<button type="submit">apply</button>
</form>
{{#if notice}}<p class="notice notice-{{notice.level}}">{{notice.message}}</p>{{/if}}
<table id="monitorTable" class="table">
<thead><tr><th></th>{{#each columns}}<th>{{this}}</th>{{/each}}</tr></thead>
<tbody>
{{#each rows}}<tr class="{{#if selected}}selected{{/if}}"><td><form method="post" action="/rows/expand" class="inline"><input type="hidden" name="service_name" value="{{service_name}}"><button type="submit">{{#if expanded}}-{{else}}+{{/if}}</button></form><form method="post" action="/rows/select" class="inline"><input type="hidden" name="service_name" value="{{service_name}}"><input type="radio" name="selected"{{#if selected}} checked{{/if}} onchange="this.form.submit()"></form></td><td>{{service_name}}</td><td>{{total_call_count}}</td><td>{{total_fail_count}}</td><td>{{load_balance}}</td><td>{{success_ratio}}</td><td>{{#each actions}}{{> action}}{{/each}}</td></tr>
{{#if detail}}<tr class="detail-view"><td colspan="7">{{{detail}}}</td></tr>
{{/if}}{{/each}}{{#if status_message}}<tr class="no-records-found"><td colspan="7">{{status_message}}</td></tr>
{{/if}}</tbody>
</table>
<div class="pagination">
{{#if pagination.has_prev}}<a href="/page?index={{pagination.prev_index}}&size={{pagination.page_size}}">prev</a>{{/if}}
<span>page {{pagination.page_number}} / {{pagination.page_count}}, total {{pagination.total}}</span>
{{#if pagination.has_next}}<a href="/page?index={{pagination.next_index}}&size={{pagination.page_size}}">next</a>{{/if}}
</div>
{{#if last_loaded_at}}<p class="updated">updated at {{last_loaded_at}}</p>{{/if}}
</body>
</html>
"#;

/// 注册全部模板
pub fn registry() -> Result<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();
    handlebars.register_partial(ACTION_PARTIAL, ACTION)?;
    handlebars.register_template_string(DETAIL_TEMPLATE, DETAIL)?;
    handlebars.register_template_string(PAGE_TEMPLATE, PAGE)?;
    Ok(handlebars)
}
