//! Integration tests for the WebSocket client connection.
//!
//! Each test starts a real `tokio-tungstenite` server on an OS-assigned
//! port and connects the client to it.

#[cfg(feature = "websocket")]
mod websocket {
    use futures_util::{SinkExt, StreamExt};
    use hapticforge_transport::{Connection, TransportError, WebSocketConnection};
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::Message;

    type ServerWs = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

    /// Binds a listener on a free port; returns it with its `ws://` URL.
    async fn listen() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().expect("bound address");
        (listener, format!("ws://{addr}"))
    }

    async fn accept(listener: &TcpListener) -> ServerWs {
        let (stream, _) = listener.accept().await.expect("should accept");
        tokio_tungstenite::accept_async(stream)
            .await
            .expect("handshake should succeed")
    }

    #[tokio::test]
    async fn test_connect_send_and_receive_text() {
        let (listener, url) = listen().await;
        let server = tokio::spawn(async move {
            let mut ws = accept(&listener).await;

            let msg = ws.next().await.unwrap().unwrap();
            assert_eq!(msg.into_text().unwrap().as_str(), r#"[{"Ok":{"Id":1}}]"#);

            ws.send(Message::Text("hello from server".into()))
                .await
                .unwrap();
            ws
        });

        let conn = WebSocketConnection::connect(&url)
            .await
            .expect("client should connect");
        assert!(conn.id().to_string().starts_with("conn-"));

        conn.send(r#"[{"Ok":{"Id":1}}]"#)
            .await
            .expect("send should succeed");

        let received = conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, "hello from server");

        let _server_ws = server.await.expect("server task");
    }

    #[tokio::test]
    async fn test_recv_returns_none_on_server_close() {
        let (listener, url) = listen().await;
        let server = tokio::spawn(async move {
            let mut ws = accept(&listener).await;
            ws.send(Message::Close(None)).await.unwrap();
            // Drain until the client acknowledges the close.
            while let Some(Ok(_)) = ws.next().await {}
        });

        let conn = WebSocketConnection::connect(&url).await.unwrap();

        let result = conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on server close");
        drop(conn);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_recv_accepts_utf8_binary_frames() {
        let (listener, url) = listen().await;
        let server = tokio::spawn(async move {
            let mut ws = accept(&listener).await;
            ws.send(Message::Binary(b"[]".to_vec().into())).await.unwrap();
            ws
        });

        let conn = WebSocketConnection::connect(&url).await.unwrap();

        assert_eq!(conn.recv().await.unwrap().as_deref(), Some("[]"));
        let _server_ws = server.await.unwrap();
    }

    #[tokio::test]
    async fn test_recv_skips_ping() {
        let (listener, url) = listen().await;
        let server = tokio::spawn(async move {
            let mut ws = accept(&listener).await;
            ws.send(Message::Ping(b"p".to_vec().into())).await.unwrap();
            ws.send(Message::Text("after ping".into())).await.unwrap();
            ws
        });

        let conn = WebSocketConnection::connect(&url).await.unwrap();

        assert_eq!(conn.recv().await.unwrap().as_deref(), Some("after ping"));
        let _server_ws = server.await.unwrap();
    }

    #[tokio::test]
    async fn test_close_sends_close_frame() {
        let (listener, url) = listen().await;
        let server = tokio::spawn(async move {
            let mut ws = accept(&listener).await;
            let msg = ws.next().await.unwrap().unwrap();
            assert!(matches!(msg, Message::Close(_)));
        });

        let conn = WebSocketConnection::connect(&url).await.unwrap();
        conn.close().await.expect("close should succeed");

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_fails() {
        let (listener, url) = listen().await;
        drop(listener);

        let result = WebSocketConnection::connect(&url).await;
        assert!(matches!(result, Err(TransportError::Connect { .. })));
    }
}
