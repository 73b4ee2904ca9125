#[cfg(test)]
mod tests {
    use std::time::Duration;

    use threadpool::ThreadPool;

    use crate::content::download_client::Client;
    use crate::content::load_service::{LayerKind, TileLoadService, UrlPattern};
    use crate::content::pipeline::PipelineMessage;
    use crate::content::tile_id::{Scheme, TileId};
    use crate::helpers::channel::unbounded_channel;

    fn service(base_url: &str, pattern: UrlPattern, targets: Vec<String>) -> TileLoadService {
        let (tx, _rx) = unbounded_channel::<PipelineMessage>();
        TileLoadService::new(
            base_url,
            pattern,
            ".jpeg",
            targets,
            LayerKind::Ortho,
            Client::new(Duration::from_secs(5)).expect("client"),
            ThreadPool::new(1),
            tx,
        )
    }

    const BASE: &str = "https://maps.wien.gv.at/basemap/bmaporthofoto30cm/normal/google3857/";

    #[test]
    fn build_tile_url() {
        let id = TileId::new(2, (1, 3), Scheme::Tms);
        assert_eq!(
            service(BASE, UrlPattern::Zxy, vec![]).build_tile_url(&id),
            format!("{BASE}2/1/3.jpeg")
        );
        assert_eq!(
            service(BASE, UrlPattern::Zyx, vec![]).build_tile_url(&id),
            format!("{BASE}2/3/1.jpeg")
        );
        assert_eq!(
            service(BASE, UrlPattern::ZxyYPointingSouth, vec![]).build_tile_url(&id),
            format!("{BASE}2/1/0.jpeg")
        );
        assert_eq!(
            service(BASE, UrlPattern::ZyxYPointingSouth, vec![]).build_tile_url(&id),
            format!("{BASE}2/0/1.jpeg")
        );
    }

    #[test]
    fn build_tile_url_converts_slippy_ids() {
        // a slippy map id addresses the same tile as its tms counterpart
        let slippy = TileId::new(2, (1, 0), Scheme::SlippyMap);
        let tms = slippy.to_scheme(Scheme::Tms);
        let service = service(BASE, UrlPattern::Zxy, vec![]);
        assert_eq!(service.build_tile_url(&slippy), service.build_tile_url(&tms));
    }

    #[test]
    fn build_tile_url_with_load_balancing() {
        let targets: Vec<String> = ["1", "2", "3", "4"].iter().map(|s| s.to_string()).collect();
        let base = "https://maps%HOST%.wien.gv.at/basemap/bmaporthofoto30cm/normal/google3857/";
        let service = service(base, UrlPattern::Zxy, targets.clone());

        let id = TileId::new(2, (1, 3), Scheme::Tms);
        let url = service.build_tile_url(&id);
        // identical tiles stay on the same host for cache friendliness
        assert_eq!(url, service.build_tile_url(&id));
        assert!(
            targets.iter().any(|host| url
                == format!(
                    "https://maps{host}.wien.gv.at/basemap/bmaporthofoto30cm/normal/google3857/2/1/3.jpeg"
                )),
            "unexpected load balanced url: {url}"
        );

        // every tile resolves to one of the configured hosts
        for x in 0..8 {
            for y in 0..8 {
                let url = service.build_tile_url(&TileId::new(3, (x, y), Scheme::Tms));
                assert!(targets.iter().any(|host| {
                    url.starts_with(&format!("https://maps{host}.wien.gv.at/"))
                }));
            }
        }
    }
}
