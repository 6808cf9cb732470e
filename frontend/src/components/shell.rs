//! 页面框架：侧边栏导航与页头用户信息

use leptos::prelude::*;
use stocksphere_shared::controllers::shell::navigation;

use crate::auth::{sign_out, use_api, use_auth};
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};

#[component]
pub fn Shell(route: AppRoute, children: Children) -> impl IntoView {
    let auth = use_auth();
    let api = use_api();
    let router = use_router();
    let badge = auth.badge();

    let nav = move || navigation(router.current_path().get());

    let on_logout = move |_| sign_out(&api);

    view! {
        <div class="drawer lg:drawer-open min-h-screen bg-base-200 font-sans">
            <input id="sidebar" type="checkbox" class="drawer-toggle" />
            <div class="drawer-content flex flex-col">
                <div class="navbar bg-base-100 shadow">
                    <div class="flex-none lg:hidden">
                        <label for="sidebar" class="btn btn-square btn-ghost">"☰"</label>
                    </div>
                    <div class="flex-1">
                        <h1 class="text-xl font-bold px-2">{route.title()}</h1>
                    </div>
                    <div class="flex-none gap-3 items-center">
                        <div class="avatar placeholder">
                            <div class="bg-primary text-primary-content rounded-full w-10">
                                <span>{move || badge.get().initial.to_string()}</span>
                            </div>
                        </div>
                        <div class="hidden md:flex flex-col leading-tight">
                            <span class="font-semibold">{move || badge.get().name}</span>
                            <span class="text-xs opacity-60">{move || badge.get().role}</span>
                        </div>
                        <button on:click=on_logout class="btn btn-outline btn-error btn-sm">
                            "Logout"
                        </button>
                    </div>
                </div>
                <main class="p-4 md:p-8 space-y-6">{children()}</main>
            </div>
            <div class="drawer-side">
                <label for="sidebar" class="drawer-overlay"></label>
                <aside class="w-64 min-h-full bg-base-100">
                    <div class="p-6 text-2xl font-bold text-primary">"StockSphere"</div>
                    <ul class="menu p-4 gap-1">
                        <For
                            each=nav
                            key=|item| (item.entry.key, item.active)
                            children=move |item| {
                                let class = if item.active { "active" } else { "" };
                                view! {
                                    <li>
                                        <Link to=item.entry.href class=class>
                                            {item.entry.label}
                                        </Link>
                                    </li>
                                }
                            }
                        />
                    </ul>
                </aside>
            </div>
        </div>
    }
}
