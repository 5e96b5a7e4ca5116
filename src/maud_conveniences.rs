use crate::listing::{Page, ROWS_PER_PAGE_CHOICES, SortColumn, SortState};
use maud::{Markup, Render, html};

pub const BUTTON: &str = "bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded";
pub const DELETE_BUTTON: &str = "bg-red-600 hover:bg-red-800 font-bold py-2 px-4 rounded";
pub const LINK_BUTTON: &str = "bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded";
pub const INPUT: &str = "shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600";

const TH: &str = "py-2 px-4 text-left font-semibold text-gray-300";
const TD: &str = "py-2 px-4 border-b border-gray-600 text-gray-200";

pub fn render_table<const N: usize>(
    overall_title: impl Render,
    titles: [&'static str; N],
    items: Vec<[Markup; N]>,
) -> Markup {
    html! {
        div class="container mx-auto" {
            (title(overall_title))
            (table_body(html! {
                @for heading in titles {
                    th class=(TH) {(heading)}
                }
            }, items))
        }
    }
}

fn table_body<const N: usize>(header_cells: Markup, items: Vec<[Markup; N]>) -> Markup {
    html! {
        div class="overflow-x-auto" {
            table class="min-w-full bg-gray-800 rounded shadow-md" {
                thead class="bg-gray-700" {
                    tr { (header_cells) }
                }
                tbody {
                    @if items.is_empty() {
                        tr {
                            td colspan=(N) class=(TD) { "Nothing here yet." }
                        }
                    }
                    @for row in items {
                        tr {
                            @for col in row {
                                td class=(TD) {(col)}
                            }
                        }
                    }
                }
            }
        }
    }
}

/// A table whose headers re-request `fragment_url` with the clicked column as `toggle`, carrying
/// the current sort and whatever `include` selects (usually the filter box).
pub fn sortable_table<C: SortColumn, const N: usize>(
    fragment_url: &str,
    target: &str,
    include: &str,
    sort: SortState<C>,
    columns: [Option<C>; N],
    items: Vec<[Markup; N]>,
) -> Markup {
    let header_cells = html! {
        @for column in columns {
            @match column {
                Some(column) => {
                    th class={(TH) " cursor-pointer hover:text-white"}
                        hx-get=(fragment_url)
                        hx-target=(target)
                        hx-include=(include)
                        hx-vals=(sort_vals(sort, column)) {
                        (column.label())
                        @if let Some(arrow) = sort.arrow_for(column) {
                            " " (arrow)
                        }
                    }
                }
                None => {
                    th class=(TH) {}
                }
            }
        }
    };

    table_body(header_cells, items)
}

fn sort_vals<C: SortColumn>(sort: SortState<C>, clicked: C) -> String {
    format!(
        r#"{{"sort": "{}", "direction": "{}", "toggle": "{}"}}"#,
        sort.column.name(),
        sort.direction.as_str(),
        clicked.name()
    )
}

/// Hidden inputs so a re-rendered fragment remembers the sort it was drawn with.
pub fn sort_inputs<C: SortColumn>(sort: SortState<C>) -> Markup {
    html! {
        input type="hidden" name="sort" value=(sort.column.name());
        input type="hidden" name="direction" value=(sort.direction.as_str());
    }
}

pub fn filter_box(fragment_url: &str, target: &str, include: &str, filter: &str) -> Markup {
    html! {
        input type="search" name="filter" value=(filter) placeholder="Filter..."
            class={(INPUT) " mb-4"}
            hx-get=(fragment_url)
            hx-target=(target)
            hx-include=(include)
            hx-trigger="input changed delay:300ms, search";
    }
}

pub fn pagination_controls(
    fragment_url: &str,
    target: &str,
    include: &str,
    page: Page,
) -> Markup {
    let go_to = |index: usize| format!(r#"{{"page": "{index}"}}"#);

    html! {
        div class="flex flex-row items-center justify-between mt-4 space-x-4" {
            label class="text-gray-300" {
                "Rows per page: "
                // a new page size starts over from the first page
                select name="rows_per_page" class="bg-gray-700 rounded p-1"
                    hx-get=(fragment_url) hx-target=(target) hx-include=(include)
                    hx-vals=(go_to(0)) {
                    @for choice in ROWS_PER_PAGE_CHOICES {
                        option value=(choice) selected[choice == page.rows_per_page] {(choice)}
                    }
                }
            }
            div class="flex flex-row items-center space-x-2" {
                button class=(BUTTON) disabled[!page.has_previous()]
                    hx-get=(fragment_url) hx-target=(target) hx-include=(include)
                    hx-vals=(go_to(page.index.saturating_sub(1))) {
                    "Previous"
                }
                span { "Page " (page.index + 1) " of " (page.count) }
                button class=(BUTTON) disabled[!page.has_next()]
                    hx-get=(fragment_url) hx-target=(target) hx-include=(include)
                    hx-vals=(go_to(page.index + 1)) {
                    "Next"
                }
            }
        }
    }
}

pub fn card(content: Markup) -> Markup {
    html! {
        div class="mx-auto bg-gray-800 p-8 rounded shadow-md max-w-4xl w-full flex flex-col space-y-4 mb-8" {
            (content)
        }
    }
}

pub fn title(s: impl Render) -> Markup {
    html! {
        h1 class="text-2xl font-semibold mb-4" {(s)}
    }
}

pub fn subtitle(s: impl Render) -> Markup {
    html! {
        h2 class="text-xl font-semibold mb-2" {(s)}
    }
}

pub fn form_element(id: &'static str, label: &'static str, input: Markup) -> Markup {
    html! {
        div class="mb-4" {
            label for=(id) class="block text-sm font-bold mb-2 text-gray-300" {(label)}
            (input)
        }
    }
}

pub fn simple_form_element(
    id: &'static str,
    label: &'static str,
    required: bool,
    kind: Option<&'static str>,
    value: Option<&str>,
) -> Markup {
    form_element(
        id,
        label,
        html! {
            input type=(kind.unwrap_or("text")) id=(id) name=(id) required[required] value=[value] class=(INPUT);
        },
    )
}

pub fn form_submit_button(label: Option<&str>) -> Markup {
    html! {
        div class="flex items-center justify-between" {
            button type="submit" class={(BUTTON) " focus:outline-none focus:shadow-outline"} {
                (label.unwrap_or("Submit"))
            }
        }
    }
}

pub fn error_banner(message: impl Render) -> Markup {
    html! {
        div class="bg-red-800 border border-red-600 text-white px-4 py-3 rounded mb-4 flex flex-row justify-between" role="alert" {
            span { (message) }
            button class="font-bold ml-4" onclick="this.parentElement.remove()" { "×" }
        }
    }
}

pub fn success_banner(message: impl Render) -> Markup {
    html! {
        div class="bg-green-800 border border-green-600 text-white px-4 py-3 rounded mb-4" role="status" {
            (message)
        }
    }
}

pub fn render_nav() -> Markup {
    const LINKS: [(&str, &str); 6] = [
        ("/", "Home"),
        ("/students", "Students"),
        ("/modules", "Modules"),
        ("/grades", "Grades"),
        ("/registrations", "Registrations"),
        ("/insights", "Insights"),
    ];

    html! {
        nav class="w-full bg-gray-800 shadow-md p-4 mb-4 flex flex-row space-x-4 justify-center" {
            @for (href, name) in LINKS {
                a href=(href) class=(LINK_BUTTON) {(name)}
            }
        }
    }
}
