use summarizer_core::SourceKind;

use crate::content::Content;

/// Render the fixed instruction document for one content value.
///
/// Deterministic: same content, same prompt. The diagram markup below is
/// contract surface shared with the viewer stylesheet; the class names must
/// be reproduced exactly.
pub fn build_summary_prompt(content: &Content) -> String {
    let type_label = match content.source {
        SourceKind::Youtube => "YouTube動画",
        SourceKind::Web => "ウェブ記事",
    };

    format!(
        r#"以下の{type_label}の内容を日本語で要約してください。
出力は必ずHTMLで返してください。マークダウンではなくHTMLタグを使ってください。
要所要所に図解を挿入して、内容を直感的にわかりやすくしてください。

## 出力構成

1. <h2>サマリー</h2> — 全体の概要を3〜5文で。
2. <h2>主要ポイント</h2> — 重要ポイントを3〜5つ。ここに1つ図解を入れる。
3. <h2>詳細</h2> — セクションごとに詳しく。各セクション間に適切な図解を入れる。
   - 具体的な情報、数値、事例を含める
   - 議論や主張の根拠も記載する
   - 重要な引用や発言があれば含める

## 図解のHTMLテンプレート（必ずこのclass名を使うこと）

### フローチャート（プロセスや流れの説明に使う）
<div class="diagram-flow">
  <div class="flow-step">ステップ1<div class="flow-sub">補足</div></div>
  <div class="flow-arrow">→</div>
  <div class="flow-step highlight">ステップ2<div class="flow-sub">補足</div></div>
  <div class="flow-arrow">→</div>
  <div class="flow-step">ステップ3</div>
</div>

### 比較カード（複数の要素を比較する時に使う）
<div class="diagram-compare">
  <div class="compare-card">
    <div class="compare-title">項目A</div>
    <div class="compare-body"><ul><li>特徴1</li><li>特徴2</li></ul></div>
  </div>
  <div class="compare-card">
    <div class="compare-title">項目B</div>
    <div class="compare-body"><ul><li>特徴1</li><li>特徴2</li></ul></div>
  </div>
</div>

### ステップ図（手順や段階の説明に使う）
<div class="diagram-steps">
  <div class="step"><div class="step-number">1</div><div class="step-line"></div><div class="step-content"><div class="step-title">タイトル</div><div class="step-desc">説明</div></div></div>
  <div class="step"><div class="step-number">2</div><div class="step-line"></div><div class="step-content"><div class="step-title">タイトル</div><div class="step-desc">説明</div></div></div>
</div>

### 数値・統計カード（重要な数値やメトリクスに使う）
<div class="diagram-stats">
  <div class="stat-card"><div class="stat-value">数値</div><div class="stat-label">ラベル</div></div>
  <div class="stat-card"><div class="stat-value">数値</div><div class="stat-label">ラベル</div></div>
</div>

### 情報ボックス（重要な注意点やポイントに使う。色: info-blue, info-green, info-yellow, info-red）
<div class="diagram-info info-blue"><div class="info-title">ポイント</div>説明テキスト</div>

### テーブル（データの比較・整理に使う）
<table class="diagram-table"><thead><tr><th>列1</th><th>列2</th></tr></thead><tbody><tr><td>値1</td><td>値2</td></tr></tbody></table>

### タイムライン（時系列の説明に使う）
<div class="diagram-timeline">
  <div class="tl-item"><div class="tl-time">時期</div><div class="tl-title">イベント</div><div class="tl-desc">説明</div></div>
</div>

### メリット・デメリット
<div class="diagram-proscons">
  <div class="pros"><div class="pc-title">メリット</div><ul><li>項目</li></ul></div>
  <div class="cons"><div class="pc-title">デメリット</div><ul><li>項目</li></ul></div>
</div>

### パーセンテージバー（割合の視覚化に使う）
<div class="diagram-bars">
  <div class="bar-item"><div class="bar-label"><span>項目</span><span>75%</span></div><div class="bar-track"><div class="bar-fill" style="width:75%"></div></div></div>
</div>

### 関係図（中心と関連要素の関係に使う）
<div class="diagram-hub">
  <div class="hub-node">要素1</div>
  <div class="hub-node">要素2</div>
  <div class="hub-center">中心</div>
  <div class="hub-node">要素3</div>
  <div class="hub-node">要素4</div>
</div>

## 図解の使い方ルール
- 内容に応じて最適な図解タイプを選ぶ（最低3つ、できれば5つ以上の図解を使う）
- テキストだけの説明が続かないよう、要所に図解を挟む
- 上記のclass名を正確に使うこと（CSSが適用される）
- <script>タグは絶対に使わないこと
- 図解以外の部分は通常のHTMLタグ（h2, h3, p, ul, li, strong, blockquote等）を使う

---

{text}"#,
        type_label = type_label,
        text = content.text,
    )
}
