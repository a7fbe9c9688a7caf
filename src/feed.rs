//! RSS 2.0 feed of the newest posts.

use crate::config::SiteConfig;
use crate::naming;
use crate::types::Post;
use rss::{Category, ChannelBuilder, Guid, Item, ItemBuilder};

/// Render `feed.xml` for the first `feed.limit` posts (posts are newest first).
pub fn render_feed(posts: &[Post], config: &SiteConfig) -> String {
    let items: Vec<Item> = posts
        .iter()
        .take(config.feed.limit)
        .map(|post| feed_item(post, config))
        .collect();

    let mut channel = ChannelBuilder::default()
        .title(config.title.clone())
        .link(config.absolute_url("/"))
        .description(config.description.clone())
        .generator(Some(format!("posthouse {}", env!("CARGO_PKG_VERSION"))))
        .items(items)
        .build();

    if let Some(newest) = posts.first() {
        channel.set_last_build_date(Some(newest.date.to_rfc2822()));
    }
    channel.to_string()
}

fn feed_item(post: &Post, config: &SiteConfig) -> Item {
    let link = config.absolute_url(&post.url);
    let categories: Vec<Category> = post
        .tags
        .iter()
        .map(|tag| Category {
            name: tag.clone(),
            domain: Some(config.absolute_url(&format!("/tags/{}/", naming::tag_slug(tag)))),
        })
        .collect();

    ItemBuilder::default()
        .title(Some(post.title.clone()))
        .link(Some(link.clone()))
        .description(Some(post.excerpt.clone()))
        .author((!config.author.is_empty()).then(|| config.author.clone()))
        .pub_date(Some(post.date.to_rfc2822()))
        .guid(Some(Guid {
            value: link,
            permalink: true,
        }))
        .categories(categories)
        .build()
}
